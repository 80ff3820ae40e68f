//! Error types for ocr-bridge.
//!
//! Every fallible operation in the library returns [`BridgeError`]:
//!
//! - Use `thiserror` for the `Error` implementation
//! - Preserve error chains with `#[source]` attributes
//! - Include context in messages (file paths, config values, image sizes)
//!
//! `Io` errors bubble up unchanged. Everything else is wrapped with a message
//! describing the stage that failed (decoding, image processing, OCR).
//!
//! # Example
//!
//! ```rust
//! use ocr_bridge::{BridgeError, Result};
//!
//! fn read_image(path: &str) -> Result<Vec<u8>> {
//!     let bytes = std::fs::read(path)?;
//!
//!     if bytes.is_empty() {
//!         return Err(BridgeError::validation(format!("Image file is empty: {}", path)));
//!     }
//!
//!     Ok(bytes)
//! }
//! ```
use thiserror::Error;

/// Result type alias using `BridgeError`.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Main error type for all ocr-bridge operations.
///
/// # Variants
///
/// - `Io` - File system and socket errors (always bubble up)
/// - `Validation` - Invalid configuration or parameters
/// - `ImageDecoding` - Payload could not be turned into bytes (base64)
/// - `ImageProcessing` - Bytes could not be turned into an RGB image
/// - `Ocr` - The OCR engine failed or returned an unrecognized shape
/// - `Serialization` - JSON/TOML/YAML serialization errors
/// - `MissingDependency` - Engine support not compiled in or not installed
/// - `Other` - Catch-all for uncommon errors
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Image decoding error: {message}")]
    ImageDecoding {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Image processing error: {message}")]
    ImageProcessing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<base64::DecodeError> for BridgeError {
    fn from(err: base64::DecodeError) -> Self {
        BridgeError::ImageDecoding {
            message: format!("Invalid base64 image data: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

impl From<image::ImageError> for BridgeError {
    fn from(err: image::ImageError) -> Self {
        BridgeError::ImageProcessing {
            message: format!("Failed to decode image: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl BridgeError {
    error_constructor!(validation, Validation);
    error_constructor!(image_decoding, ImageDecoding);
    error_constructor!(image_processing, ImageProcessing);
    error_constructor!(ocr, Ocr);
    error_constructor!(serialization, Serialization);

    /// The underlying message without the stage prefix added by `Display`.
    ///
    /// This is what HTTP clients see; logs use [`BridgeError::chain`].
    pub fn message(&self) -> String {
        match self {
            BridgeError::Io(err) => err.to_string(),
            BridgeError::Validation { message, .. }
            | BridgeError::ImageDecoding { message, .. }
            | BridgeError::ImageProcessing { message, .. }
            | BridgeError::Ocr { message, .. }
            | BridgeError::Serialization { message, .. } => message.clone(),
            BridgeError::MissingDependency(message) | BridgeError::Other(message) => message.clone(),
        }
    }

    /// Render the error together with every `source()` in its chain.
    ///
    /// Used when logging failures so the root cause is not lost behind the
    /// top-level message.
    pub fn chain(&self) -> String {
        let mut rendered = self.to_string();
        let mut current = std::error::Error::source(self);
        while let Some(cause) = current {
            let cause_text = cause.to_string();
            if !rendered.contains(&cause_text) {
                rendered.push_str(": ");
                rendered.push_str(&cause_text);
            }
            current = cause.source();
        }
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BridgeError = io_err.into();
        assert!(matches!(err, BridgeError::Io(_)));
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_validation_error() {
        let err = BridgeError::validation("port must be non-zero");
        assert_eq!(err.to_string(), "Validation error: port must be non-zero");
    }

    #[test]
    fn test_ocr_error_with_source() {
        let source = std::io::Error::other("predictor crashed");
        let err = BridgeError::ocr_with_source("predict failed", source);
        assert_eq!(err.to_string(), "OCR error: predict failed");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_message_drops_stage_prefix() {
        assert_eq!(BridgeError::ocr("ValueError: bad shape").message(), "ValueError: bad shape");
        assert_eq!(BridgeError::Other("OCR task failed".into()).message(), "OCR task failed");

        let err: BridgeError = std::io::Error::other("disk gone").into();
        assert_eq!(err.message(), "disk gone");
    }

    #[test]
    fn test_base64_error_from() {
        let err: BridgeError = base64::DecodeError::InvalidPadding.into();
        assert!(matches!(err, BridgeError::ImageDecoding { .. }));
        assert!(err.to_string().starts_with("Image decoding error: Invalid base64 image data"));
    }

    #[test]
    fn test_serde_json_error_from() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: BridgeError = json_err.into();
        assert!(matches!(err, BridgeError::Serialization { .. }));
    }

    #[test]
    fn test_chain_includes_distinct_sources() {
        let source = std::io::Error::other("CUDA out of memory");
        let err = BridgeError::ocr_with_source("predict failed", source);
        assert_eq!(err.chain(), "OCR error: predict failed: CUDA out of memory");
    }

    #[test]
    fn test_chain_skips_repeated_source_text() {
        let err: BridgeError = base64::DecodeError::InvalidPadding.into();
        let chain = err.chain();
        assert_eq!(chain.matches("Invalid padding").count(), 1);
    }

    #[test]
    fn test_missing_dependency_display() {
        let err = BridgeError::MissingDependency("paddleocr".to_string());
        assert_eq!(err.to_string(), "Missing dependency: paddleocr");
    }

    #[test]
    fn test_other_display_is_verbatim() {
        let err = BridgeError::Other("something odd".to_string());
        assert_eq!(err.to_string(), "something odd");
    }
}
