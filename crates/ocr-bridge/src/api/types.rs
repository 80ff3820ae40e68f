//! API request and response types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::engine::{OcrEngine, TextLine};

/// Successful OCR response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResponse {
    /// Always `true`
    pub success: bool,
    /// Recognized lines in engine order
    pub lines: Vec<TextLine>,
    /// Milliseconds from request entry to response, two decimals
    pub processing_time: f64,
}

/// Error response.
///
/// `processing_time` is absent on validation failures, which are rejected
/// before any processing starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Error message
    pub error: String,
    /// Milliseconds spent before the failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status
    pub status: String,
    /// Whether the OCR engine is ready
    pub ocr_ready: bool,
}

/// API server state.
///
/// Holds the engine built at startup. Cloned per request; the clone only
/// bumps the `Arc`.
#[derive(Clone)]
pub struct ApiState {
    /// Shared OCR engine
    pub engine: Arc<dyn OcrEngine>,
}

impl ApiState {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }
}

impl fmt::Debug for ApiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiState").field("engine", &self.engine.name()).finish()
    }
}
