//! API request handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::{Json, body::Bytes, extract::State};
use serde_json::Value;

use crate::{BridgeError, Result, engine::TextLine, pipeline};

use super::{
    error::ApiError,
    types::{ApiState, HealthResponse, OcrResponse},
};

/// OCR endpoint handler.
///
/// POST /ocr
///
/// Accepts a JSON body `{"image": "<base64 or data URL>"}` and returns the
/// recognized lines.
///
/// - Body that is not a JSON object with an `image` key: 400, fixed message,
///   no `processing_time`
/// - Any failure after that (base64, image decoding, inference): 500 with the
///   error message and `processing_time`
///
/// Decoding and inference block, so they run on tokio's blocking pool. A
/// panic inside the engine surfaces as a 500 like any other failure.
pub async fn ocr_handler(State(state): State<ApiState>, body: Bytes) -> std::result::Result<Json<OcrResponse>, ApiError> {
    let start = Instant::now();

    let image = image_field(&body).ok_or_else(ApiError::bad_request)?;

    let engine = Arc::clone(&state.engine);
    let outcome = tokio::task::spawn_blocking(move || -> Result<Vec<TextLine>> {
        let payload = image
            .as_str()
            .ok_or_else(|| BridgeError::validation("Field 'image' must be a base64 string"))?;
        pipeline::recognize_payload(engine.as_ref(), payload)
    })
    .await
    .unwrap_or_else(|e| Err(BridgeError::Other(format!("OCR task failed: {}", e))));

    let processing_time = elapsed_ms(start);

    match outcome {
        Ok(lines) => Ok(Json(OcrResponse {
            success: true,
            lines,
            processing_time,
        })),
        Err(err) => {
            tracing::error!(error = ?err, "Error processing OCR: {}", err.chain());
            Err(ApiError::processing(&err, processing_time))
        }
    }
}

/// Health check endpoint handler.
///
/// GET /health
///
/// Reports ready unconditionally; engine construction either succeeded
/// before the server started or the process never got here.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        ocr_ready: true,
    })
}

/// Pull the `image` value out of a JSON object body.
fn image_field(body: &[u8]) -> Option<Value> {
    let mut value: Value = serde_json::from_slice(body).ok()?;
    value.as_object_mut()?.remove("image")
}

fn elapsed_ms(start: Instant) -> f64 {
    (start.elapsed().as_secs_f64() * 1000.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_field_extraction() {
        assert_eq!(image_field(br#"{"image": "AAAA"}"#), Some(Value::from("AAAA")));
        assert_eq!(image_field(br#"{"image": null}"#), Some(Value::Null));
        assert_eq!(image_field(br#"{"picture": "AAAA"}"#), None);
        assert_eq!(image_field(br#"["image"]"#), None);
        assert_eq!(image_field(b"not json"), None);
        assert_eq!(image_field(b""), None);
    }

    #[test]
    fn test_elapsed_ms_is_small_and_non_negative() {
        let ms = elapsed_ms(Instant::now());
        assert!(ms.is_finite());
        assert!(ms >= 0.0);
        assert!(ms < 1000.0);
    }
}
