// ABOUTME: Per-endpoint rate limiting middleware for the coaching routes
// ABOUTME: Rejects over-budget clients with 429 and reports window state in response headers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Rate Limiting Middleware with HTTP Headers
//!
//! Runs before body parsing, so a rejected request costs no JSON work and no
//! model call. Allowed and denied responses both carry the window headers.

use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use coach_core::errors::AppError;
use http::{HeaderMap, HeaderValue};

use super::client_key::{client_key, is_unknown};
use crate::logging::AppLogger;
use crate::models::Endpoint;
use crate::rate_limiting::{RateLimitStatus, SlidingWindowRateLimiter};

/// HTTP header names for rate limiting
pub mod headers {
    /// Maximum requests allowed in the window
    pub const X_RATE_LIMIT_LIMIT: &str = "x-ratelimit-limit";
    /// Requests left in the current window
    pub const X_RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
    /// Window duration in seconds
    pub const X_RATE_LIMIT_WINDOW: &str = "x-ratelimit-window";
    /// Seconds until a slot frees up
    pub const RETRY_AFTER: &str = "retry-after";
}

/// State for one endpoint's rate limiting layer
#[derive(Clone)]
pub struct RateLimitLayer {
    limiter: SlidingWindowRateLimiter,
    endpoint: Endpoint,
}

impl RateLimitLayer {
    /// Limit `endpoint` with the shared limiter
    #[must_use]
    pub const fn new(limiter: SlidingWindowRateLimiter, endpoint: Endpoint) -> Self {
        Self { limiter, endpoint }
    }
}

/// Whole seconds, rounded up, never below one
fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    secs.max(1)
}

/// Write rate limit headers for `status`
pub fn apply_rate_limit_headers(target: &mut HeaderMap, status: &RateLimitStatus) {
    target.insert(headers::X_RATE_LIMIT_LIMIT, HeaderValue::from(status.limit));
    target.insert(
        headers::X_RATE_LIMIT_REMAINING,
        HeaderValue::from(status.remaining),
    );
    target.insert(
        headers::X_RATE_LIMIT_WINDOW,
        HeaderValue::from(status.window.as_secs()),
    );
    if let Some(retry_after) = status.retry_after {
        target.insert(headers::RETRY_AFTER, HeaderValue::from(ceil_secs(retry_after)));
    }
}

/// Rate limiting middleware for one endpoint
pub async fn rate_limit_middleware(
    State(layer): State<RateLimitLayer>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let trust_forwarded = layer.limiter.config().trust_forwarded_header;
    let key = client_key(request.headers(), peer, trust_forwarded);

    if is_unknown(&key) {
        AppLogger::log_security_event(
            "rate_limit_unknown_client",
            "No client address available, using shared bucket",
            None,
        );
    }

    let status = layer.limiter.check(&key, layer.endpoint);
    if !status.allowed {
        AppLogger::log_security_event(
            "rate_limit_exceeded",
            layer.endpoint.as_str(),
            Some(&key),
        );
        let mut response = AppError::rate_limited().into_response();
        apply_rate_limit_headers(response.headers_mut(), &status);
        return response;
    }

    let mut response = next.run(request).await;
    apply_rate_limit_headers(response.headers_mut(), &status);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_after_rounds_up() {
        assert_eq!(ceil_secs(Duration::from_millis(59_100)), 60);
        assert_eq!(ceil_secs(Duration::from_secs(3)), 3);
        assert_eq!(ceil_secs(Duration::ZERO), 1);
    }

    #[test]
    fn test_denied_status_headers() {
        let mut map = HeaderMap::new();
        apply_rate_limit_headers(
            &mut map,
            &RateLimitStatus {
                allowed: false,
                limit: 15,
                remaining: 0,
                window: Duration::from_secs(60),
                retry_after: Some(Duration::from_millis(12_500)),
            },
        );
        assert_eq!(map[headers::X_RATE_LIMIT_LIMIT], "15");
        assert_eq!(map[headers::X_RATE_LIMIT_REMAINING], "0");
        assert_eq!(map[headers::X_RATE_LIMIT_WINDOW], "60");
        assert_eq!(map[headers::RETRY_AFTER], "13");
    }
}
