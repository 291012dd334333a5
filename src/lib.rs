//! Chat Proxy - A validating backend proxy for a chat-completion API
//!
//! This library implements a single-purpose HTTP backend that checks
//! user-supplied prompts and generation parameters, forwards one
//! chat-completion request to an upstream OpenAI-compatible API, and
//! returns a normalized response envelope:
//!
//! - **Parameter Validation**: Raw-JSON field checks with specific messages
//! - **Request Shaping**: Defaults, second-pass clamping, stop-sequence splitting
//! - **Single Outbound Call**: One attempt per request, bounded by a timeout
//! - **Error Translation**: Upstream failures mapped onto a fixed taxonomy
//! - **Rate Limiting**: Per-client token buckets in front of the pipeline
//!
//! # Architecture
//!
//! The codebase is organized into two layers:
//!
//! - [`core`]: Configuration, errors, rate limiting, logging context
//! - [`api`]: HTTP handlers, models, and the validate/build/forward pipeline
//!
//! # Configuration
//!
//! The server requires the following environment variable:
//! - `OPENAI_API_KEY`: Upstream API credential (startup fails without it)
//!
//! Optional environment variables:
//! - `OPENAI_BASE_URL`: Upstream base URL (default: https://api.openai.com/v1)
//! - `HOST`: Server bind address (default: 0.0.0.0)
//! - `PORT`: Server port (default: 3001)
//! - `ENVIRONMENT`: Deployment name reported by /health (default: development)
//! - `ALLOWED_ORIGINS`: Comma-separated CORS origins or `*` (default: `*`)
//! - `REQUEST_TIMEOUT_SECS`: Upstream call timeout (default: 30)
//! - `RATE_LIMIT_PER_MINUTE`: Per-client budget, 0 disables (default: 60)
//! - `RATE_LIMIT_BURST`: Burst allowance (default: 10)

pub mod api;
pub mod core;

// Re-export commonly used types for convenience
pub use api::{router, AppState, ChatRequest, UpstreamRequest};
pub use core::{AppConfig, AppError, RateLimiter, Result};
