//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use corehr_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// HTTP-boundary wrapper for [`AppError`].
///
/// Handlers return this so `?` on any domain result converts
/// automatically; the wrapper decides status code and safe message.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let (status, error_code, message) = match err.kind {
            // Every authentication failure collapses into one generic
            // response; the internal reason is logged, never exposed.
            ErrorKind::Authentication => {
                tracing::warn!(reason = %err.message, "Authentication failure");
                (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "Authentication failed".to_string(),
                )
            }
            ErrorKind::Authorization => (StatusCode::FORBIDDEN, "FORBIDDEN", err.message),
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.message),
            ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT", err.message),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", err.message),
            _ => {
                tracing::error!(error = %err.message, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = ApiErrorResponse {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
