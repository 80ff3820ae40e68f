//! REST API server for the OCR bridge.
//!
//! An Axum-based HTTP server wrapping one shared [`OcrEngine`](crate::engine::OcrEngine).
//!
//! # Endpoints
//!
//! - `POST /ocr` - Recognize text in a base64-encoded image
//! - `GET /health` - Health check endpoint
//!
//! # Responses
//!
//! ```text
//! 200 {"success": true, "lines": [{"text": "...", "confidence": 0.98}], "processing_time": 41.7}
//! 400 {"success": false, "error": "No image data provided"}
//! 500 {"success": false, "error": "...", "processing_time": 3.12}
//! ```
//!
//! # cURL Examples
//!
//! ```bash
//! # Recognize an image
//! curl -X POST http://localhost:5000/ocr \
//!      -H 'Content-Type: application/json' \
//!      -d "{\"image\": \"data:image/png;base64,$(base64 -w0 receipt.png)\"}"
//!
//! # Health check
//! curl http://localhost:5000/health
//! ```

mod error;
mod handlers;
mod server;
mod types;

pub use error::{ApiError, ApiErrorKind, NO_IMAGE_MESSAGE};
pub use handlers::{health_handler, ocr_handler};
pub use server::{create_router, create_router_with_config, serve};
pub use types::{ApiState, ErrorResponse, HealthResponse, OcrResponse};
