// ABOUTME: Environment-based configuration for the coach server
// ABOUTME: Reads HTTP, model, rate limiting and CORS settings from environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Environment-only configuration.
//!
//! Every value has a default except the Gemini API key, which the server
//! binary requires before it starts serving.

use std::env;
use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use coach_core::constants::{limits, llm, ports, rate_limits};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::Endpoint;

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// API key that never appears in `Debug` output
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Raw key for request signing
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Generative model configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Gemini API key
    pub api_key: Option<ApiKey>,
    /// Model name
    pub model: String,
    /// API base URL
    pub base_url: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Optional output token cap
    pub max_output_tokens: Option<u32>,
    /// Upper bound on one model call
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: llm::DEFAULT_GEMINI_MODEL.to_owned(),
            base_url: llm::GEMINI_API_BASE_URL.to_owned(),
            temperature: llm::DEFAULT_TEMPERATURE,
            max_output_tokens: None,
            timeout: Duration::from_secs(llm::DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Sliding-window budget for one endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointLimit {
    /// Requests allowed inside one window
    pub max_requests: u32,
    /// Trailing window length
    pub window: Duration,
}

impl EndpointLimit {
    /// Create a limit from a request count and window seconds
    #[must_use]
    pub const fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    pub enabled: bool,
    /// Budget of `/conversation`
    pub conversation: EndpointLimit,
    /// Budget of `/get_hint`
    pub hint: EndpointLimit,
    /// Use the first `X-Forwarded-For` address as the client key
    pub trust_forwarded_header: bool,
    /// Tracked keys above which stale entries are evicted on access
    pub cleanup_threshold: usize,
    /// Interval of the background stale-key sweep
    pub sweep_interval: Duration,
}

impl RateLimitConfig {
    /// Budget for an endpoint
    #[must_use]
    pub const fn limit_for(&self, endpoint: Endpoint) -> EndpointLimit {
        match endpoint {
            Endpoint::Conversation => self.conversation,
            Endpoint::Hint => self.hint,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            conversation: EndpointLimit::new(
                rate_limits::CONVERSATION_MAX_REQUESTS,
                rate_limits::CONVERSATION_WINDOW_SECS,
            ),
            hint: EndpointLimit::new(rate_limits::HINT_MAX_REQUESTS, rate_limits::HINT_WINDOW_SECS),
            trust_forwarded_header: true,
            cleanup_threshold: rate_limits::DEFAULT_CLEANUP_THRESHOLD,
            sweep_interval: Duration::from_secs(rate_limits::DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    /// Allowed origins; empty disables the CORS layer, `*` allows any
    pub allowed_origins: Vec<String>,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// HTTP port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Model settings
    pub llm: LlmConfig,
    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,
    /// CORS settings
    pub cors: CorsConfig,
    /// Maximum accepted request body size
    pub max_request_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: ports::DEFAULT_HTTP_HOST.to_owned(),
            http_port: ports::DEFAULT_HTTP_PORT,
            environment: Environment::default(),
            llm: LlmConfig::default(),
            rate_limit: RateLimitConfig::default(),
            cors: CorsConfig::default(),
            max_request_body_bytes: limits::DEFAULT_MAX_REQUEST_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if any present variable fails to parse
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let http_port = match env::var("HTTP_PORT").or_else(|_| env::var("PORT")) {
            Ok(port) => port.parse().context("Invalid HTTP_PORT value")?,
            Err(_) => ports::DEFAULT_HTTP_PORT,
        };

        let config = Self {
            host: env_var_or("HTTP_HOST", ports::DEFAULT_HTTP_HOST),
            http_port,
            environment: Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development")),
            llm: LlmConfig {
                api_key: env::var("GEMINI_API_KEY")
                    .ok()
                    .filter(|key| !key.trim().is_empty())
                    .map(ApiKey::new),
                model: env_var_or("GEMINI_MODEL", llm::DEFAULT_GEMINI_MODEL),
                base_url: env_var_or("GEMINI_BASE_URL", llm::GEMINI_API_BASE_URL),
                temperature: env_var_or("LLM_TEMPERATURE", &llm::DEFAULT_TEMPERATURE.to_string())
                    .parse()
                    .context("Invalid LLM_TEMPERATURE value")?,
                max_output_tokens: env::var("LLM_MAX_OUTPUT_TOKENS")
                    .ok()
                    .map(|value| value.parse())
                    .transpose()
                    .context("Invalid LLM_MAX_OUTPUT_TOKENS value")?,
                timeout: Duration::from_secs(
                    env_var_or("LLM_TIMEOUT_SECS", &llm::DEFAULT_TIMEOUT_SECS.to_string())
                        .parse()
                        .context("Invalid LLM_TIMEOUT_SECS value")?,
                ),
            },
            rate_limit: RateLimitConfig {
                enabled: env_var_or("RATE_LIMIT_ENABLED", "true")
                    .parse()
                    .context("Invalid RATE_LIMIT_ENABLED value")?,
                conversation: EndpointLimit::new(
                    env_var_or(
                        "RATE_LIMIT_CONVERSATION_REQUESTS",
                        &rate_limits::CONVERSATION_MAX_REQUESTS.to_string(),
                    )
                    .parse()
                    .context("Invalid RATE_LIMIT_CONVERSATION_REQUESTS value")?,
                    env_var_or(
                        "RATE_LIMIT_CONVERSATION_WINDOW_SECS",
                        &rate_limits::CONVERSATION_WINDOW_SECS.to_string(),
                    )
                    .parse()
                    .context("Invalid RATE_LIMIT_CONVERSATION_WINDOW_SECS value")?,
                ),
                hint: EndpointLimit::new(
                    env_var_or(
                        "RATE_LIMIT_HINT_REQUESTS",
                        &rate_limits::HINT_MAX_REQUESTS.to_string(),
                    )
                    .parse()
                    .context("Invalid RATE_LIMIT_HINT_REQUESTS value")?,
                    env_var_or(
                        "RATE_LIMIT_HINT_WINDOW_SECS",
                        &rate_limits::HINT_WINDOW_SECS.to_string(),
                    )
                    .parse()
                    .context("Invalid RATE_LIMIT_HINT_WINDOW_SECS value")?,
                ),
                trust_forwarded_header: env_var_or("RATE_LIMIT_TRUST_FORWARDED", "true")
                    .parse()
                    .context("Invalid RATE_LIMIT_TRUST_FORWARDED value")?,
                cleanup_threshold: env_var_or(
                    "RATE_LIMIT_CLEANUP_THRESHOLD",
                    &rate_limits::DEFAULT_CLEANUP_THRESHOLD.to_string(),
                )
                .parse()
                .context("Invalid RATE_LIMIT_CLEANUP_THRESHOLD value")?,
                sweep_interval: Duration::from_secs(
                    env_var_or(
                        "RATE_LIMIT_SWEEP_INTERVAL_SECS",
                        &rate_limits::DEFAULT_SWEEP_INTERVAL_SECS.to_string(),
                    )
                    .parse()
                    .context("Invalid RATE_LIMIT_SWEEP_INTERVAL_SECS value")?,
                ),
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(&env_var_or("CORS_ALLOWED_ORIGINS", "")),
            },
            max_request_body_bytes: env_var_or(
                "MAX_REQUEST_BODY_BYTES",
                &limits::DEFAULT_MAX_REQUEST_BODY_BYTES.to_string(),
            )
            .parse()
            .context("Invalid MAX_REQUEST_BODY_BYTES value")?,
        };

        info!(
            environment = %config.environment,
            http_port = config.http_port,
            model = %config.llm.model,
            rate_limit_enabled = config.rate_limit.enabled,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Socket address string for binding
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    origins_str
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!(Environment::from_str_or_default("PROD"), Environment::Production);
        assert_eq!(Environment::from_str_or_default("test"), Environment::Testing);
        assert_eq!(Environment::from_str_or_default("staging"), Environment::Development);
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("https://a.example, https://b.example,,"),
            vec!["https://a.example", "https://b.example"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("super-secret");
        assert_eq!(format!("{key:?}"), "[REDACTED]");
        assert_eq!(key.expose(), "super-secret");
    }

    #[test]
    fn test_default_limits() {
        let config = RateLimitConfig::default();
        assert_eq!(config.limit_for(Endpoint::Conversation).max_requests, 20);
        assert_eq!(config.limit_for(Endpoint::Hint).max_requests, 15);
        assert_eq!(config.limit_for(Endpoint::Hint).window, Duration::from_secs(60));
    }
}
