use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Connection pool exhausted; the client may retry.
    #[error("Service is busy, please retry")]
    Busy,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Map a store failure to a response, keeping the endpoint's documented
    /// error message. The underlying cause is logged (inside the request
    /// span, so operation and identifiers come along), never returned.
    pub fn from_store(err: StoreError, message: &str) -> Self {
        match err {
            StoreError::PoolExhausted => {
                tracing::warn!("connection pool exhausted");
                ApiError::Busy
            }
            StoreError::Database(cause) => {
                tracing::error!(error = %cause, "store operation failed");
                ApiError::Internal(message.to_string())
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::from_store(err, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Busy => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
