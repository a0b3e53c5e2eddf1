//! HTTP error responses.
//!
//! Every failure the API reports has the same shape, `{"error": "..."}`, so
//! clients can handle all endpoints alike.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

use crate::error::Error;
use crate::note::PayloadError;

/// Body message for any rejected request payload or query.
pub const INVALID_REQUEST_MESSAGE: &str = "Invalid JSON data in request body";

/// Body message when a write cannot reach the store.
pub const STORE_UNAVAILABLE_MESSAGE: &str = "Note store unavailable";

/// Body message for unexpected failures.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// A request that could not be served.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The body or query was missing or malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A write could not reach the note store.
    #[error("note store unavailable: {0}")]
    StoreUnavailable(String),

    /// Anything else went wrong.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message; details stay in the logs.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => INVALID_REQUEST_MESSAGE,
            Self::StoreUnavailable(_) => STORE_UNAVAILABLE_MESSAGE,
            Self::Internal(_) => INTERNAL_ERROR_MESSAGE,
        }
    }
}

impl From<PayloadError> for ApiError {
    fn from(err: PayloadError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        if err.is_store_unavailable() {
            Self::StoreUnavailable(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::InvalidRequest(reason) => warn!("Rejected request: {}", reason),
            Self::StoreUnavailable(reason) => warn!("Write failed, store unavailable: {}", reason),
            Self::Internal(reason) => error!("Request failed: {}", reason),
        }
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_invalid_request_response() {
        let (status, body) = body_json(PayloadError::Empty.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid JSON data in request body"}));
    }

    #[tokio::test]
    async fn test_store_unavailable_response() {
        let (status, body) = body_json(Error::store_unavailable("down").into()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({"error": "Note store unavailable"}));
    }

    #[tokio::test]
    async fn test_internal_response() {
        let (status, body) = body_json(Error::internal("bug").into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Internal server error"}));
    }

    #[test]
    fn test_error_classification() {
        assert!(matches!(
            ApiError::from(Error::store_unavailable("x")),
            ApiError::StoreUnavailable(_)
        ));
        assert!(matches!(
            ApiError::from(Error::invalid_document("x")),
            ApiError::Internal(_)
        ));
        assert!(matches!(
            ApiError::from(PayloadError::EmptySelector),
            ApiError::InvalidRequest(_)
        ));
        assert!(matches!(
            ApiError::from(PayloadError::MalformedQuery("%".to_string())),
            ApiError::InvalidRequest(_)
        ));
    }
}
