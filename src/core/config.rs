//! Configuration management for the chat proxy server.
//!
//! All configuration is read from the environment exactly once at startup
//! and carried through the application as an explicit [`AppConfig`] value.
//! Request handling never reads the environment.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port)
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream chat-completion API configuration
    pub upstream: UpstreamConfig,

    /// Deployment environment name, reported by the health endpoint
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Allowed CORS origins; `["*"]` means any origin
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Per-client rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// Server-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Configuration for the upstream chat-completion API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// API key for authentication; required, never exposed to clients
    pub api_key: String,

    /// Base URL of the upstream API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout in seconds for the single outbound call
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Per-client rate limiting configuration.
///
/// A quota of 0 requests per minute disables the rate-limiting layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum requests per minute per client
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    /// Maximum burst size (allows temporary spikes)
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: default_requests_per_minute(),
            burst_size: default_burst(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_requests_per_minute() -> u32 {
    60
}

fn default_burst() -> u32 {
    10
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// Fails fast when `OPENAI_API_KEY` is absent or empty; every other
    /// variable falls back to a documented default.
    ///
    /// Environment variables:
    /// - `OPENAI_API_KEY` (required)
    /// - `OPENAI_BASE_URL` (default: `https://api.openai.com/v1`)
    /// - `HOST` (default: `0.0.0.0`), `PORT` (default: `3001`)
    /// - `ENVIRONMENT` (default: `development`)
    /// - `ALLOWED_ORIGINS` (comma-separated list or `*`; default: `*`)
    /// - `REQUEST_TIMEOUT_SECS` (default: `30`)
    /// - `RATE_LIMIT_PER_MINUTE` (default: `60`; `0` disables)
    /// - `RATE_LIMIT_BURST` (default: `10`)
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            bail!("OPENAI_API_KEY environment variable is required");
        }

        let mut config = Self {
            server: ServerConfig::default(),
            upstream: UpstreamConfig {
                api_key,
                base_url: default_base_url(),
                request_timeout_secs: default_request_timeout(),
            },
            environment: default_environment(),
            allowed_origins: default_allowed_origins(),
            rate_limit: RateLimitConfig::default(),
        };

        if let Ok(host) = std::env::var("HOST") {
            config.server.host = host;
        }

        if let Ok(port_str) = std::env::var("PORT") {
            config.server.port = port_str
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT value: {}", port_str))?;
        }

        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            let base_url = base_url.trim();
            if !base_url.is_empty() {
                config.upstream.base_url = base_url.to_string();
            }
        }

        if let Ok(timeout_str) = std::env::var("REQUEST_TIMEOUT_SECS") {
            config.upstream.request_timeout_secs = timeout_str
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid REQUEST_TIMEOUT_SECS value: {}", timeout_str))?;
        }

        if let Ok(environment) = std::env::var("ENVIRONMENT") {
            let environment = environment.trim();
            if !environment.is_empty() {
                config.environment = environment.to_string();
            }
        }

        if let Ok(origins) = std::env::var("ALLOWED_ORIGINS") {
            config.allowed_origins = parse_origin_list(&origins);
        }

        if let Ok(rpm_str) = std::env::var("RATE_LIMIT_PER_MINUTE") {
            config.rate_limit.requests_per_minute = rpm_str
                .trim()
                .parse::<u32>()
                .with_context(|| format!("Invalid RATE_LIMIT_PER_MINUTE value: {}", rpm_str))?;
        }

        if let Ok(burst_str) = std::env::var("RATE_LIMIT_BURST") {
            config.rate_limit.burst_size = burst_str
                .trim()
                .parse::<u32>()
                .with_context(|| format!("Invalid RATE_LIMIT_BURST value: {}", burst_str))?;
        }

        Ok(config)
    }

    /// Whether any CORS origin is allowed.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// Parse a comma-separated origin list, dropping empty entries.
///
/// A bare `*` (or an empty list) means any origin.
fn parse_origin_list(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        default_allowed_origins()
    } else {
        origins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "OPENAI_API_KEY",
            "OPENAI_BASE_URL",
            "HOST",
            "PORT",
            "ENVIRONMENT",
            "ALLOWED_ORIGINS",
            "REQUEST_TIMEOUT_SECS",
            "RATE_LIMIT_PER_MINUTE",
            "RATE_LIMIT_BURST",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_requires_api_key() {
        clear_env();
        let result = AppConfig::from_env();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("OPENAI_API_KEY"));
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_blank_api_key() {
        clear_env();
        std::env::set_var("OPENAI_API_KEY", "   ");
        assert!(AppConfig::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        std::env::set_var("OPENAI_API_KEY", "sk-test");
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.upstream.base_url, "https://api.openai.com/v1");
        assert_eq!(config.upstream.request_timeout_secs, 30);
        assert_eq!(config.environment, "development");
        assert_eq!(config.allowed_origins, vec!["*"]);
        assert_eq!(config.rate_limit.requests_per_minute, 60);
        assert_eq!(config.rate_limit.burst_size, 10);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("OPENAI_API_KEY", "sk-test");
        std::env::set_var("PORT", "8080");
        std::env::set_var("ENVIRONMENT", "production");
        std::env::set_var("REQUEST_TIMEOUT_SECS", "10");
        std::env::set_var("RATE_LIMIT_PER_MINUTE", "120");
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.environment, "production");
        assert_eq!(config.upstream.request_timeout_secs, 10);
        assert_eq!(config.rate_limit.requests_per_minute, 120);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_port() {
        clear_env();
        std::env::set_var("OPENAI_API_KEY", "sk-test");
        std::env::set_var("PORT", "not-a-port");
        assert!(AppConfig::from_env().is_err());
        clear_env();
    }

    #[test]
    fn test_parse_origin_list() {
        assert_eq!(
            parse_origin_list("https://a.example, https://b.example"),
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(parse_origin_list("*"), vec!["*"]);
        assert_eq!(parse_origin_list(" , ,"), vec!["*"]);
    }

    #[test]
    fn test_allows_any_origin() {
        let mut config = AppConfig {
            server: ServerConfig::default(),
            upstream: UpstreamConfig {
                api_key: "sk-test".to_string(),
                base_url: default_base_url(),
                request_timeout_secs: 30,
            },
            environment: "test".to_string(),
            allowed_origins: vec!["*".to_string()],
            rate_limit: RateLimitConfig::default(),
        };
        assert!(config.allows_any_origin());

        config.allowed_origins = vec!["https://app.example".to_string()];
        assert!(!config.allows_any_origin());
    }
}
