//! Error responses of the dashboard host

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Backend client error, mapped by kind
    #[error(transparent)]
    Backend(#[from] tmz_common::Error),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        use tmz_common::Error;

        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Backend(err) => match err {
                Error::Api { .. } => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
                Error::MalformedResponse(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_MALFORMED"),
                Error::Transport(_) => (StatusCode::SERVICE_UNAVAILABLE, "UPSTREAM_UNAVAILABLE"),
                Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
                Error::Superseded(_) => (StatusCode::CONFLICT, "SUPERSEDED"),
                Error::Config(_) | Error::Io(_) | Error::Internal(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.parts();

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
