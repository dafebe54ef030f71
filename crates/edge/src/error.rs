//! Edge error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::routing::RoutingError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum EdgeError {
    // Client errors
    #[error("Missing Host header")]
    MissingHost,
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Request body too large")]
    PayloadTooLarge,
    #[error("Missing or invalid admin token")]
    Unauthorized,
    #[error("Resource not found")]
    NotFound,

    // Upstream errors
    #[error("Upstream error: {0}")]
    Upstream(String),
    #[error("Upstream timed out")]
    UpstreamTimeout,

    // Internal errors
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for EdgeError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Client
            EdgeError::MissingHost => (StatusCode::BAD_REQUEST, "MISSING_HOST", self.to_string()),
            EdgeError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            EdgeError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                self.to_string(),
            ),
            EdgeError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                self.to_string(),
            ),
            EdgeError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),

            // Upstream
            EdgeError::Upstream(_) => (
                StatusCode::BAD_GATEWAY,
                "BAD_GATEWAY",
                "Upstream unavailable".to_string(),
            ),
            EdgeError::UpstreamTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "GATEWAY_TIMEOUT",
                self.to_string(),
            ),

            // Internal
            EdgeError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "Database error".to_string(),
            ),
            EdgeError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                self.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<RoutingError> for EdgeError {
    fn from(err: RoutingError) -> Self {
        match err {
            RoutingError::MissingHost => EdgeError::MissingHost,
        }
    }
}

impl From<sqlx::Error> for EdgeError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        match err {
            sqlx::Error::RowNotFound => EdgeError::NotFound,
            _ => EdgeError::Database(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for EdgeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            tracing::warn!("Upstream timed out: {}", err);
            EdgeError::UpstreamTimeout
        } else {
            tracing::warn!("Upstream request failed: {}", err);
            EdgeError::Upstream(err.to_string())
        }
    }
}

/// Result type alias for edge handlers
pub type EdgeResult<T> = Result<T, EdgeError>;
