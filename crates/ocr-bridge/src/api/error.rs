//! HTTP error mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::BridgeError;

use super::types::ErrorResponse;

/// Message returned when the request carries no usable `image` field.
pub const NO_IMAGE_MESSAGE: &str = "No image data provided";

/// Error categories visible to HTTP clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Missing or malformed input (400)
    BadRequest,
    /// Any failure while decoding, normalizing or recognizing (500)
    ProcessingError,
}

impl ApiErrorKind {
    pub fn status_code(self) -> StatusCode {
        match self {
            ApiErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ApiErrorKind::ProcessingError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error returned by API handlers, rendered as an [`ErrorResponse`].
#[derive(Debug, Clone)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub body: ErrorResponse,
}

impl ApiError {
    /// The request body is not JSON or has no `image` key.
    pub fn bad_request() -> Self {
        Self {
            kind: ApiErrorKind::BadRequest,
            body: ErrorResponse {
                success: false,
                error: NO_IMAGE_MESSAGE.to_string(),
                processing_time: None,
            },
        }
    }

    /// A failure after validation; carries the elapsed time so far.
    ///
    /// The body holds the underlying message only, without the stage prefix.
    pub fn processing(err: &BridgeError, processing_time: f64) -> Self {
        Self {
            kind: ApiErrorKind::ProcessingError,
            body: ErrorResponse {
                success: false,
                error: err.message(),
                processing_time: Some(processing_time),
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.kind.status_code(), Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_has_no_processing_time() {
        let err = ApiError::bad_request();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let json = serde_json::to_value(&err.body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": "No image data provided"})
        );
    }

    #[test]
    fn test_processing_error_keeps_message_and_time() {
        let source = BridgeError::ocr("model not loaded");
        let err = ApiError::processing(&source, 12.5);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.error, "model not loaded");
        assert_eq!(err.body.processing_time, Some(12.5));
    }
}
