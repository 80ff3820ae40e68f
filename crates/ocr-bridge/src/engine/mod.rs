//! OCR engine abstraction.
//!
//! The bridge never recognizes text itself. It hands an RGB image to an
//! [`OcrEngine`] and reshapes whatever comes back into [`TextLine`]s.
//!
//! Engines report their output as a list of [`Page`]s, one per processed
//! image, each holding parallel `texts` / `scores` lists. The score list may be
//! shorter than the text list; missing scores count as `0.0`.
//!
//! # Thread Safety
//!
//! Engines are built once at startup and shared across requests behind an
//! `Arc`, so they must be `Send + Sync`. Whether concurrent `predict` calls
//! actually run in parallel is up to the engine.

#[cfg(feature = "paddle")]
pub mod paddle;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::Result;

/// One unit of engine output: recognized lines and their confidences.
///
/// Field names on the wire follow PaddleOCR's result dictionaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(rename = "rec_texts", default)]
    pub texts: Vec<String>,
    #[serde(rename = "rec_scores", default)]
    pub scores: Vec<f64>,
}

impl Page {
    pub fn new(texts: Vec<String>, scores: Vec<f64>) -> Self {
        Self { texts, scores }
    }
}

/// A recognized line of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    /// Engine confidence in `[0, 1]`
    pub confidence: f64,
}

/// Trait implemented by OCR engines.
///
/// # Example
///
/// ```rust
/// use ocr_bridge::engine::{OcrEngine, Page};
/// use ocr_bridge::Result;
/// use image::RgbImage;
///
/// struct FixedEngine;
///
/// impl OcrEngine for FixedEngine {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     fn predict(&self, _image: &RgbImage) -> Result<Vec<Page>> {
///         Ok(vec![Page::new(vec!["hello".to_string()], vec![0.99])])
///     }
/// }
/// ```
pub trait OcrEngine: Send + Sync {
    /// Short engine identifier used in logs.
    fn name(&self) -> &str;

    /// Run detection and recognition on a single RGB image.
    ///
    /// Blocking. Callers on an async runtime should move the call onto a
    /// blocking thread.
    ///
    /// # Errors
    ///
    /// - `BridgeError::Ocr` - inference failed or the engine returned a shape
    ///   that could not be read as pages
    fn predict(&self, image: &RgbImage) -> Result<Vec<Page>>;
}

/// Flatten engine pages into a single ordered list of lines.
///
/// Page order and within-page order are preserved. A text without a score at
/// the same index gets confidence `0.0`.
pub fn flatten_pages(pages: &[Page]) -> Vec<TextLine> {
    pages
        .iter()
        .flat_map(|page| {
            page.texts.iter().enumerate().map(|(i, text)| TextLine {
                text: text.clone(),
                confidence: page.scores.get(i).copied().unwrap_or(0.0),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(texts: &[&str], scores: &[f64]) -> Page {
        Page::new(texts.iter().map(|t| t.to_string()).collect(), scores.to_vec())
    }

    #[test]
    fn test_flatten_preserves_order_and_defaults_missing_scores() {
        let pages = vec![page(&["Hi"], &[0.9]), page(&["Bye", "Yo"], &[0.5])];

        let lines = flatten_pages(&pages);

        assert_eq!(
            lines,
            vec![
                TextLine {
                    text: "Hi".to_string(),
                    confidence: 0.9
                },
                TextLine {
                    text: "Bye".to_string(),
                    confidence: 0.5
                },
                TextLine {
                    text: "Yo".to_string(),
                    confidence: 0.0
                },
            ]
        );
    }

    #[test]
    fn test_flatten_ignores_extra_scores() {
        let lines = flatten_pages(&[page(&["only"], &[0.7, 0.2, 0.1])]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].confidence, 0.7);
    }

    #[test]
    fn test_flatten_empty_inputs() {
        assert!(flatten_pages(&[]).is_empty());
        assert!(flatten_pages(&[Page::default(), Page::default()]).is_empty());
    }

    #[test]
    fn test_page_deserializes_paddle_field_names() {
        let page: Page = serde_json::from_str(r#"{"rec_texts": ["a", "b"], "rec_scores": [0.25]}"#).unwrap();
        assert_eq!(page.texts, vec!["a", "b"]);
        assert_eq!(page.scores, vec![0.25]);

        let empty: Page = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, Page::default());
    }
}
