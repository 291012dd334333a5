//! Core functionality for the chat proxy server.
//!
//! This module contains fundamental components used throughout the application:
//! - Configuration management
//! - Error handling
//! - Rate limiting
//! - Request-scoped logging context

pub mod config;
pub mod error;
pub mod logging;
pub mod rate_limiter;

// Re-export commonly used types
pub use config::{AppConfig, RateLimitConfig, ServerConfig, UpstreamConfig};
pub use error::{AppError, Result};
pub use logging::{generate_request_id, get_request_id, REQUEST_ID};
pub use rate_limiter::{client_key, RateLimiter};
