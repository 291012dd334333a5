//! API layer for the chat proxy server.
//!
//! This module contains the HTTP handlers, the request/response models,
//! and the validate/build/forward pipeline behind `POST /api/chat`.

pub mod builder;
pub mod handlers;
pub mod models;
pub mod upstream;
pub mod validate;

// Re-export commonly used types
pub use builder::build_payload;
pub use handlers::{chat, health, router, AppState};
pub use models::{
    ChatMessage, ChatRequest, ChatSuccess, HealthResponse, UpstreamRequest, UpstreamResponse,
    Usage, DEFAULT_MODEL,
};
pub use upstream::{classify_upstream_error, send_chat};
pub use validate::validate;
