//! Per-client rate limiting for the chat endpoint.
//!
//! Uses the token bucket algorithm via the governor crate, one independent
//! bucket per client identity. Clients are identified by the first
//! `x-forwarded-for` hop when the server sits behind a proxy, falling back
//! to a single shared bucket otherwise.

use axum::http::HeaderMap;
use dashmap::DashMap;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use nonzero_ext::nonzero;
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::core::config::RateLimitConfig;
use crate::core::error::AppError;

/// Type alias for the rate limiter instance
type RateLimiterInstance = Arc<GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Bucket key used when no client identity can be derived.
const SHARED_CLIENT_KEY: &str = "local";

/// Rate limiter managing per-client request budgets.
pub struct RateLimiter {
    /// Map of client key -> rate limiter instance
    limiters: DashMap<String, RateLimiterInstance>,

    /// Quota applied to every client; None disables the layer
    quota: Option<Quota>,
}

impl RateLimiter {
    /// Create a rate limiter from configuration.
    ///
    /// A quota of 0 requests per minute disables rate limiting entirely.
    pub fn new(config: &RateLimitConfig) -> Self {
        let quota = NonZeroU32::new(config.requests_per_minute).map(|rpm| {
            Quota::per_minute(rpm)
                .allow_burst(NonZeroU32::new(config.burst_size).unwrap_or(nonzero!(1u32)))
        });

        Self {
            limiters: DashMap::new(),
            quota,
        }
    }

    /// Check whether a request from the given client is allowed.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the request is within budget (or limiting is disabled)
    /// * `Err(AppError::RateLimitExceeded)` if the budget is exhausted
    pub fn check(&self, client: &str) -> Result<(), AppError> {
        let Some(quota) = self.quota else {
            return Ok(());
        };

        let limiter = self
            .limiters
            .entry(client.to_string())
            .or_insert_with(|| Arc::new(GovernorRateLimiter::direct(quota)))
            .clone();

        match limiter.check() {
            Ok(_) => Ok(()),
            Err(_) => {
                tracing::warn!(client = client, "rate limit exceeded");
                Err(AppError::RateLimitExceeded)
            }
        }
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.limiters.len()
    }
}

/// Derive the rate-limit bucket key for a request.
///
/// Takes the first hop of `x-forwarded-for` when present; direct
/// deployments share one bucket.
pub fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(SHARED_CLIENT_KEY)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(requests_per_minute: u32, burst_size: u32) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            requests_per_minute,
            burst_size,
        })
    }

    #[test]
    fn test_allows_within_limit() {
        let limiter = limit(60, 10);

        // Should allow up to burst_size requests
        for _ in 0..10 {
            assert!(limiter.check("client-a").is_ok());
        }
    }

    #[test]
    fn test_blocks_over_limit() {
        let limiter = limit(60, 5);

        for _ in 0..5 {
            assert!(limiter.check("client-a").is_ok());
        }

        // Next request should be blocked
        assert!(limiter.check("client-a").is_err());
    }

    #[test]
    fn test_zero_quota_disables_limiting() {
        let limiter = limit(0, 10);

        for _ in 0..100 {
            assert!(limiter.check("client-a").is_ok());
        }
        assert_eq!(limiter.tracked_clients(), 0);
    }

    #[test]
    fn test_clients_have_independent_budgets() {
        let limiter = limit(60, 5);

        for _ in 0..5 {
            assert!(limiter.check("client-a").is_ok());
        }
        assert!(limiter.check("client-a").is_err());

        // client-b is unaffected by client-a's exhausted budget
        for _ in 0..5 {
            assert!(limiter.check("client-b").is_ok());
        }
        assert!(limiter.check("client-b").is_err());
    }

    #[test]
    fn test_client_key_from_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        assert_eq!(client_key(&headers), "203.0.113.7");
    }

    #[test]
    fn test_client_key_fallback() {
        assert_eq!(client_key(&HeaderMap::new()), "local");

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "  ".parse().unwrap());
        assert_eq!(client_key(&headers), "local");
    }
}
