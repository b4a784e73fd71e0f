//! HTTP error mapping for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::AppError;
use serde_json::json;

/// Wrapper turning the shared error taxonomy into HTTP responses
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::Tool { stage, .. } => {
                // Tool diagnostics stay in the logs, not in responses.
                tracing::error!(error = %self.0, "ingestion failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Video processing failed at {}", stage),
                )
            }
            AppError::Storage { stage, .. } => {
                tracing::error!(error = %self.0, "storage call failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Storage operation failed at {}", stage),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
