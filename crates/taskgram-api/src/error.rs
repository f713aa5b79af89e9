//! API error types.
//!
//! These errors only ever surface on the direct extraction endpoint and
//! the health route. The webhook handler is a hard firewall: it catches
//! and logs everything internally and never converts an error into a
//! non-200 response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use taskgram_extractor::ExtractError;
use taskgram_store::StoreError;

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// API error type for consistent error responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "success": false,
            "error": self.to_string()
        }));
        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(format!("store error: {}", err))
    }
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        match err {
            // Callers of the direct endpoint want to know extraction
            // failed rather than silently getting "no task".
            ExtractError::Parse(e) => ApiError::Internal(format!("extraction failed: {}", e)),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            ApiError::BadRequest("test".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal("test".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::BadRequest("text is required".into());
        assert_eq!(err.to_string(), "bad request: text is required");
    }

    #[test]
    fn test_parse_error_maps_to_internal() {
        let parse_err = taskgram_extractor::parse_extraction("not json").unwrap_err();
        let err: ApiError = ExtractError::Parse(parse_err).into();

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("extraction failed"));
    }
}
