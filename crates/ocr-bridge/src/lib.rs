//! ocr-bridge - HTTP bridge for a PaddleOCR engine
//!
//! A small service that accepts base64-encoded images over HTTP, hands them to
//! a long-lived OCR engine, and returns the recognized text lines with
//! confidence scores and timing.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! # #[cfg(feature = "paddle")]
//! # async fn run() -> ocr_bridge::Result<()> {
//! use std::sync::Arc;
//! use ocr_bridge::{BridgeConfig, api::serve, engine::paddle::PaddleOcrEngine};
//!
//! let config = BridgeConfig::default();
//! let engine = PaddleOcrEngine::new(&config.engine)?;
//! serve(&config, Arc::new(engine)).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Core** (`core`): configuration loading, discovery, env overrides
//! - **Payload** (`payload`): data-URL stripping, base64, RGB normalization
//! - **Engine** (`engine`): `OcrEngine` trait, page flattening, PaddleOCR bridge
//! - **Pipeline** (`pipeline`): payload to lines, shared by server and CLI
//! - **API** (`api`): Axum router and handlers
//!
//! # Features
//!
//! - `api` (default): HTTP server
//! - `paddle`: PaddleOCR engine through an embedded Python interpreter

#![deny(unsafe_code)]

pub mod core;
pub mod engine;
pub mod error;
pub mod payload;
pub mod pipeline;

#[cfg(feature = "api")]
pub mod api;

pub use crate::core::config::{BridgeConfig, Device, EngineConfig, ServerConfig};
pub use engine::{OcrEngine, Page, TextLine, flatten_pages};
pub use error::{BridgeError, Result};
pub use pipeline::{recognize_bytes, recognize_image, recognize_payload};

/// Build the engine selected at compile time.
///
/// # Errors
///
/// - `BridgeError::MissingDependency` - the crate was built without an engine
///   feature, or the engine's runtime is not installed
/// - `BridgeError::Ocr` - engine construction failed
pub fn build_engine(config: &EngineConfig) -> Result<std::sync::Arc<dyn OcrEngine>> {
    #[cfg(feature = "paddle")]
    {
        let engine = engine::paddle::PaddleOcrEngine::new(config)?;
        Ok(std::sync::Arc::new(engine))
    }

    #[cfg(not(feature = "paddle"))]
    {
        let _ = config;
        Err(BridgeError::MissingDependency(
            "no OCR engine compiled in; rebuild with the `paddle` feature".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    #[cfg(not(feature = "paddle"))]
    #[test]
    fn test_build_engine_without_engine_feature() {
        let err = super::build_engine(&super::EngineConfig::default()).err().unwrap();
        assert!(matches!(err, super::BridgeError::MissingDependency(_)));
    }
}
