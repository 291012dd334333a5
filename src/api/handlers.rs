//! HTTP request handlers and router for the chat proxy.
//!
//! One POST route runs the whole pipeline: rate limit, validate, build,
//! forward, translate. Every call is independent; nothing is retained
//! between requests.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::builder::build_payload;
use crate::api::models::{ChatSuccess, HealthResponse};
use crate::api::upstream::send_chat;
use crate::api::validate::validate;
use crate::core::config::AppConfig;
use crate::core::logging::{generate_request_id, REQUEST_ID};
use crate::core::rate_limiter::{client_key, RateLimiter};
use crate::core::{AppError, Result};

/// Content reported when the upstream returns no message text.
const EMPTY_COMPLETION_FALLBACK: &str = "No response generated.";

/// Shared application state.
pub struct AppState {
    pub config: AppConfig,
    pub http_client: reqwest::Client,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Build the shared state from configuration.
    ///
    /// The HTTP client is pooled and carries the configured upstream
    /// timeout, so an expired call is aborted rather than left hanging.
    pub fn new(config: AppConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream.request_timeout_secs))
            .pool_max_idle_per_host(20)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .expect("Failed to build HTTP client");

        let rate_limiter = RateLimiter::new(&config.rate_limit);

        Self {
            config,
            http_client,
            rate_limiter,
        }
    }
}

/// Build the application router with all routes and layers.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);

    // Method mismatches on known paths report the same 404 envelope as
    // unknown paths, so every miss on this surface looks identical.
    Router::new()
        .route("/health", get(health).fallback(fallback))
        .route("/api/chat", post(chat).fallback(fallback))
        .fallback(fallback)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle a chat completion request.
///
/// The body is taken as raw bytes so malformed or wrong-typed input is
/// reported through the error taxonomy instead of a framework rejection.
#[tracing::instrument(skip_all)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let request_id = generate_request_id();

    REQUEST_ID
        .scope(request_id.clone(), async move {
            state.rate_limiter.check(&client_key(&headers))?;

            let raw: serde_json::Value = serde_json::from_slice(&body)
                .map_err(|_| AppError::Validation("Request body must be valid JSON".to_string()))?;
            let request = validate(&raw)?;
            let payload = build_payload(&request);

            tracing::debug!(
                request_id = %request_id,
                model = %payload.model,
                messages = payload.messages.len(),
                "forwarding chat completion request"
            );

            let upstream = send_chat(&state.http_client, &state.config.upstream, &payload).await?;

            let content = upstream
                .choices
                .first()
                .and_then(|choice| choice.message.as_ref())
                .and_then(|message| message.content.clone())
                .unwrap_or_else(|| EMPTY_COMPLETION_FALLBACK.to_string());

            tracing::debug!(
                request_id = %request_id,
                model = %upstream.model,
                "chat completion succeeded"
            );

            Ok(Json(ChatSuccess {
                success: true,
                content,
                usage: upstream.usage,
                model: upstream.model,
            })
            .into_response())
        })
        .await
}

/// Liveness check.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
        environment: state.config.environment.clone(),
    })
}

/// Catch-all for unmatched routes.
async fn fallback() -> AppError {
    AppError::NotFound
}

/// Build the CORS layer from the configured allowed-origins list.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
