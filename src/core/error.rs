//! Error types and handling for the chat proxy server.
//!
//! This module provides a unified error type [`AppError`] covering the full
//! error taxonomy, with conversion into the wire envelope `{error, type}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Main error type for the application.
///
/// Every failure a client can observe is one of these variants; each maps to
/// a fixed HTTP status and an opaque `type` tag. Internal detail never
/// reaches the wire.
#[derive(Error, Debug)]
pub enum AppError {
    /// Client supplied a request that fails a validation rule
    #[error("{0}")]
    Validation(String),

    /// Upstream rejected the configured credential
    #[error("Invalid API key")]
    InvalidKey,

    /// Upstream account has exhausted its quota
    #[error("API quota exceeded. Please check your plan and billing details.")]
    QuotaExceeded,

    /// Upstream does not recognize the requested model
    #[error("The requested model does not exist or is not available")]
    ModelNotFound,

    /// Upstream rate limit was hit
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimit,

    /// The outbound call did not complete within the configured timeout
    #[error("The request to the language model timed out")]
    Timeout,

    /// Local rate-limiting layer rejected the request
    #[error("Too many requests. Please try again later.")]
    RateLimitExceeded,

    /// No route matched the request
    #[error("Endpoint not found")]
    NotFound,

    /// Anything unexpected; the payload is internal detail for logs only
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    /// The opaque `type` tag reported in the error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::InvalidKey => "invalid_key",
            AppError::QuotaExceeded => "quota_exceeded",
            AppError::ModelNotFound => "model_not_found",
            AppError::RateLimit => "rate_limit",
            AppError::Timeout => "timeout",
            AppError::RateLimitExceeded => "rate_limit_exceeded",
            AppError::NotFound => "not_found",
            AppError::Internal(_) => "server_error",
        }
    }

    /// The HTTP status associated with this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidKey => StatusCode::UNAUTHORIZED,
            AppError::QuotaExceeded => StatusCode::PAYMENT_REQUIRED,
            AppError::ModelNotFound => StatusCode::BAD_REQUEST,
            AppError::RateLimit => StatusCode::TOO_MANY_REQUESTS,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(detail) = &self {
            tracing::error!(detail = %detail, "internal server error");
        }

        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
            "type": self.kind(),
        }));

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AppError::Timeout
        } else {
            AppError::Internal(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

/// Convenience type alias for Results using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
