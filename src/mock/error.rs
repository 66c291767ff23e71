//! Mock Backend Error Types
//!
//! Converted to JSON error responses with a request id, the shape callers
//! see from the real backend.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Mock backend error types
#[derive(Error, Debug)]
pub enum MockError {
    /// Missing, malformed or rejected bearer token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Request validation failed
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            MockError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            MockError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        };

        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::warn!(
            request_id = %request_id,
            error_code = %code,
            error_message = %self,
            "Mock backend rejected request"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for mock handlers
pub type MockResult<T> = Result<T, MockError>;
