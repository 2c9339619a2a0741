//! Structured HTTP errors for the pricewatch server.
//!
//! Every error is rendered as `{"error": "<message>"}` with a status code
//! matching its kind.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pricewatch_core::Error;
use serde_json::json;

/// Errors surfaced to HTTP callers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed request input.
    #[error("{0}")]
    BadRequest(String),

    /// Nothing to return (no prices found, empty store).
    #[error("{0}")]
    NotFound(String),

    /// Unexpected failure while serving the request.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidUrl(msg) => ApiError::BadRequest(msg),
            other => {
                tracing::error!(error = %other, "request failed");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
