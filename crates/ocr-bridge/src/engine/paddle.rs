//! PaddleOCR engine bridged through an embedded Python interpreter.
//!
//! The `paddleocr` Python package is the whole OCR pipeline; this module only
//! constructs it once and forwards images to `PaddleOCR.predict`.
//!
//! # GIL handling
//!
//! - The interpreter is initialized in [`PaddleOcrEngine::new`], before the
//!   first `Python::attach`.
//! - The PaddleOCR object is kept as a `Py<PyAny>`, which is `Send + Sync`, so
//!   the engine can sit in an `Arc` shared by request handlers.
//! - `predict` holds the GIL for the whole inference call. Concurrent requests
//!   therefore serialize on the GIL; callers on an async runtime must run it
//!   inside `spawn_blocking`.
//!
//! # Result shape
//!
//! `predict` returns a list of result objects that behave like dicts. For each
//! dict page, `rec_texts` (list of str) and `rec_scores` (list or ndarray of
//! floats) are read. Non-dict pages are skipped, a non-list result yields no
//! pages, and a dict page with values of the wrong type is an error.

use image::RgbImage;
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyDict, PyList};

use crate::core::config::{Device, EngineConfig};
use crate::engine::{OcrEngine, Page};
use crate::{BridgeError, Result};

/// PaddleOCR pipeline instance.
pub struct PaddleOcrEngine {
    ocr: Py<PyAny>,
    language: String,
    device: Device,
}

impl PaddleOcrEngine {
    /// Build the PaddleOCR pipeline (`PaddleOCR(lang=..., device=...)`).
    ///
    /// Blocking: model download and weight loading happen here.
    ///
    /// # Errors
    ///
    /// - `BridgeError::MissingDependency` - `paddleocr` cannot be imported
    /// - `BridgeError::Ocr` - the constructor raised
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Python::initialize();

        tracing::info!(
            "Initializing PaddleOCR (lang={}, device={})...",
            config.language,
            config.device
        );

        let ocr = Python::attach(|py| -> Result<Py<PyAny>> {
            let module = PyModule::import(py, "paddleocr").map_err(|e| {
                BridgeError::MissingDependency(format!("Python package 'paddleocr' could not be imported: {}", e))
            })?;

            let build = || -> PyResult<Py<PyAny>> {
                let kwargs = PyDict::new(py);
                kwargs.set_item("lang", config.language.as_str())?;
                kwargs.set_item("device", config.device.to_string())?;
                Ok(module.getattr("PaddleOCR")?.call((), Some(&kwargs))?.unbind())
            };

            build().map_err(|e| BridgeError::ocr_with_source(format!("Failed to initialize PaddleOCR: {}", e), e))
        })?;

        tracing::info!("PaddleOCR initialized successfully");

        Ok(Self {
            ocr,
            language: config.language.clone(),
            device: config.device,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn device(&self) -> Device {
        self.device
    }
}

impl OcrEngine for PaddleOcrEngine {
    fn name(&self) -> &str {
        "paddleocr"
    }

    fn predict(&self, image: &RgbImage) -> Result<Vec<Page>> {
        Python::attach(|py| {
            let array = rgb_to_ndarray(py, image)
                .map_err(|e| BridgeError::ocr_with_source(format!("Failed to build numpy array: {}", e), e))?;

            let result = self
                .ocr
                .bind(py)
                .call_method1("predict", (array,))
                .map_err(|e| {
                    let message = e.value(py).to_string();
                    BridgeError::ocr_with_source(message, e)
                })?;

            pages_from_result(&result)
        })
    }
}

/// Copy an RGB buffer into a `(height, width, 3)` uint8 ndarray.
fn rgb_to_ndarray<'py>(py: Python<'py>, image: &RgbImage) -> PyResult<Bound<'py, PyAny>> {
    let numpy = PyModule::import(py, "numpy")?;
    let (width, height) = image.dimensions();
    let buffer = PyBytes::new(py, image.as_raw());

    // frombuffer views immutable bytes; copy so the engine may write in place.
    numpy
        .call_method1("frombuffer", (buffer, "uint8"))?
        .call_method1("reshape", ((height as usize, width as usize, 3usize),))?
        .call_method0("copy")
}

fn pages_from_result(result: &Bound<'_, PyAny>) -> Result<Vec<Page>> {
    let Ok(list) = result.cast::<PyList>() else {
        tracing::debug!("PaddleOCR returned a non-list result, treating as no text");
        return Ok(Vec::new());
    };

    let mut pages = Vec::with_capacity(list.len());
    for (index, item) in list.iter().enumerate() {
        let Ok(page) = item.cast::<PyDict>() else {
            tracing::debug!("Skipping non-mapping page {} in PaddleOCR result", index);
            continue;
        };

        let texts: Vec<String> = match page_field(page, "rec_texts", index)? {
            Some(value) => value.extract().map_err(|e| {
                BridgeError::ocr_with_source(format!("Page {} field 'rec_texts' is not a list of strings", index), e)
            })?,
            None => Vec::new(),
        };

        let scores: Vec<f64> = match page_field(page, "rec_scores", index)? {
            Some(value) => value.extract().map_err(|e| {
                BridgeError::ocr_with_source(format!("Page {} field 'rec_scores' is not a list of numbers", index), e)
            })?,
            None => Vec::new(),
        };

        pages.push(Page::new(texts, scores));
    }

    Ok(pages)
}

/// Fetch a page field, converting ndarrays to plain lists. Missing and `None`
/// values both read as absent.
fn page_field<'py>(page: &Bound<'py, PyDict>, key: &str, index: usize) -> Result<Option<Bound<'py, PyAny>>> {
    let lookup = || -> PyResult<Option<Bound<'py, PyAny>>> {
        match page.get_item(key)? {
            Some(value) if value.is_none() => Ok(None),
            Some(value) if value.hasattr("tolist")? => Ok(Some(value.call_method0("tolist")?)),
            other => Ok(other),
        }
    };

    lookup().map_err(|e| BridgeError::ocr_with_source(format!("Failed to read '{}' from page {}: {}", key, index, e), e))
}
