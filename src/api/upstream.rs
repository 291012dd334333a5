//! The single outbound call to the upstream chat-completion API.
//!
//! One attempt per inbound request; the shared client enforces the
//! configured timeout and aborts the in-flight call on expiry. Upstream
//! failures are classified into the fixed error taxonomy here, never
//! forwarded raw.

use axum::http::StatusCode;
use std::error::Error;

use crate::api::models::{UpstreamErrorBody, UpstreamRequest, UpstreamResponse};
use crate::core::config::UpstreamConfig;
use crate::core::error::AppError;
use crate::core::logging::get_request_id;
use crate::core::Result;

/// Send the built payload upstream and return the decoded response.
pub async fn send_chat(
    client: &reqwest::Client,
    config: &UpstreamConfig,
    payload: &UpstreamRequest,
) -> Result<UpstreamResponse> {
    let url = format!(
        "{}/chat/completions",
        config.base_url.trim_end_matches('/')
    );

    let response = client
        .post(&url)
        .bearer_auth(&config.api_key)
        .header("Content-Type", "application/json")
        .json(payload)
        .send()
        .await
        .map_err(|e| {
            tracing::error!(
                request_id = %get_request_id(),
                url = %url,
                model = %payload.model,
                error = %e,
                error_source = ?e.source(),
                is_timeout = e.is_timeout(),
                is_connect = e.is_connect(),
                "HTTP request to upstream failed"
            );
            if e.is_timeout() {
                AppError::Timeout
            } else {
                AppError::Internal(e.to_string())
            }
        })?;

    // reqwest carries the older http StatusCode; bridge to the axum one.
    let status =
        StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    tracing::debug!(
        request_id = %get_request_id(),
        url = %url,
        status = %status,
        "HTTP request to upstream completed"
    );

    if status.is_success() {
        return response.json::<UpstreamResponse>().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout
            } else {
                AppError::Internal(format!("failed to decode upstream response: {}", e))
            }
        });
    }

    let body = response
        .json::<UpstreamErrorBody>()
        .await
        .unwrap_or_default();
    Err(classify_upstream_error(status, &body))
}

/// Map an upstream error response onto the fixed taxonomy.
///
/// Classification looks at the error body's `code`/`type` first, then the
/// HTTP status. Anything unrecognized becomes a sanitized internal error.
pub fn classify_upstream_error(status: StatusCode, body: &UpstreamErrorBody) -> AppError {
    let detail = body.error.as_ref();
    let code = detail
        .and_then(|d| d.code.as_ref())
        .and_then(|c| c.as_str())
        .unwrap_or("");
    let kind = detail.and_then(|d| d.kind.as_deref()).unwrap_or("");

    // Quota errors arrive as 429s upstream; check them before rate limits.
    if code == "insufficient_quota" || kind == "insufficient_quota" {
        return AppError::QuotaExceeded;
    }
    if status == StatusCode::UNAUTHORIZED || code == "invalid_api_key" {
        return AppError::InvalidKey;
    }
    if code == "model_not_found" {
        return AppError::ModelNotFound;
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return AppError::RateLimit;
    }

    tracing::error!(
        request_id = %get_request_id(),
        status = %status,
        code = code,
        kind = kind,
        message = detail.and_then(|d| d.message.as_deref()).unwrap_or(""),
        "unexpected upstream error"
    );
    AppError::Internal(format!("upstream returned {}", status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn body(value: serde_json::Value) -> UpstreamErrorBody {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_classify_insufficient_quota() {
        let err = classify_upstream_error(
            StatusCode::TOO_MANY_REQUESTS,
            &body(json!({"error": {"message": "You exceeded your current quota", "type": "insufficient_quota", "code": "insufficient_quota"}})),
        );
        assert_matches!(err, AppError::QuotaExceeded);
    }

    #[test]
    fn test_classify_invalid_key() {
        let err = classify_upstream_error(
            StatusCode::UNAUTHORIZED,
            &body(json!({"error": {"message": "Incorrect API key provided"}})),
        );
        assert_matches!(err, AppError::InvalidKey);

        let err = classify_upstream_error(
            StatusCode::BAD_REQUEST,
            &body(json!({"error": {"code": "invalid_api_key"}})),
        );
        assert_matches!(err, AppError::InvalidKey);
    }

    #[test]
    fn test_classify_model_not_found() {
        let err = classify_upstream_error(
            StatusCode::NOT_FOUND,
            &body(json!({"error": {"message": "The model does not exist", "code": "model_not_found"}})),
        );
        assert_matches!(err, AppError::ModelNotFound);
    }

    #[test]
    fn test_classify_rate_limit() {
        let err = classify_upstream_error(
            StatusCode::TOO_MANY_REQUESTS,
            &body(json!({"error": {"message": "Rate limit reached", "type": "requests"}})),
        );
        assert_matches!(err, AppError::RateLimit);
    }

    #[test]
    fn test_classify_unknown_is_sanitized_internal() {
        let err = classify_upstream_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            &body(json!({"error": {"message": "secret upstream detail"}})),
        );
        assert_matches!(err, AppError::Internal(_));
        // User-facing text must not carry the upstream message.
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn test_classify_empty_body() {
        let err = classify_upstream_error(StatusCode::BAD_GATEWAY, &UpstreamErrorBody::default());
        assert_matches!(err, AppError::Internal(_));
    }
}
