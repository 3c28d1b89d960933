// ABOUTME: Security response headers for every HTTP response
// ABOUTME: Environment-specific header sets applied by an axum middleware
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Security Headers Middleware
//!
//! The coach only serves JSON, so the content security policy forbids every
//! resource type. `Strict-Transport-Security` is sent only in production.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use http::header::{
    CONTENT_SECURITY_POLICY, REFERRER_POLICY, STRICT_TRANSPORT_SECURITY, X_CONTENT_TYPE_OPTIONS,
    X_FRAME_OPTIONS,
};
use http::{HeaderMap, HeaderName, HeaderValue};

use crate::config::Environment;

const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");
const CROSS_ORIGIN_OPENER_POLICY: HeaderName = HeaderName::from_static("cross-origin-opener-policy");
const CROSS_ORIGIN_RESOURCE_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-resource-policy");

/// Security headers configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityConfig {
    /// Content-Security-Policy header value
    pub csp: &'static str,
    /// X-Frame-Options header value
    pub frame_options: &'static str,
    /// X-Content-Type-Options header value
    pub content_type_options: &'static str,
    /// Referrer-Policy header value
    pub referrer_policy: &'static str,
    /// Permissions-Policy header value
    pub permissions_policy: &'static str,
    /// Strict-Transport-Security header value
    pub hsts: Option<&'static str>,
    /// Cross-Origin-Opener-Policy header value
    pub coop: &'static str,
    /// Cross-Origin-Resource-Policy header value
    pub corp: &'static str,
}

impl SecurityConfig {
    /// Create security configuration for an environment
    #[must_use]
    pub const fn from_environment(environment: Environment) -> Self {
        if environment.is_production() {
            Self::production()
        } else {
            Self::development()
        }
    }

    /// Development configuration: no HSTS, cross-origin reads allowed
    #[must_use]
    pub const fn development() -> Self {
        Self {
            csp: "default-src 'none'; frame-ancestors 'none'; base-uri 'none'; form-action 'none'",
            frame_options: "DENY",
            content_type_options: "nosniff",
            referrer_policy: "strict-origin-when-cross-origin",
            permissions_policy: "geolocation=(), microphone=(), camera=(), payment=(), usb=()",
            hsts: None,
            coop: "same-origin",
            corp: "cross-origin",
        }
    }

    /// Production configuration
    #[must_use]
    pub const fn production() -> Self {
        Self {
            csp: "default-src 'none'; frame-ancestors 'none'; base-uri 'none'; form-action 'none'; upgrade-insecure-requests",
            frame_options: "DENY",
            content_type_options: "nosniff",
            referrer_policy: "no-referrer",
            permissions_policy: "geolocation=(), microphone=(), camera=(), payment=(), usb=()",
            hsts: Some("max-age=31536000; includeSubDomains"),
            coop: "same-origin",
            corp: "same-site",
        }
    }

    /// Headers to attach to every response
    #[must_use]
    pub fn to_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_SECURITY_POLICY, HeaderValue::from_static(self.csp));
        headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static(self.frame_options));
        headers.insert(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static(self.content_type_options),
        );
        headers.insert(REFERRER_POLICY, HeaderValue::from_static(self.referrer_policy));
        headers.insert(
            PERMISSIONS_POLICY,
            HeaderValue::from_static(self.permissions_policy),
        );
        headers.insert(CROSS_ORIGIN_OPENER_POLICY, HeaderValue::from_static(self.coop));
        headers.insert(CROSS_ORIGIN_RESOURCE_POLICY, HeaderValue::from_static(self.corp));

        if let Some(hsts) = self.hsts {
            headers.insert(STRICT_TRANSPORT_SECURITY, HeaderValue::from_static(hsts));
        }

        headers
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self::development()
    }
}

/// Attach the configured security headers to the response
///
/// Headers already set by the handler are kept.
pub async fn security_headers_middleware(
    State(headers): State<Arc<HeaderMap>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let target = response.headers_mut();
    for (name, value) in headers.iter() {
        if !target.contains_key(name) {
            target.insert(name.clone(), value.clone());
        }
    }
    response
}
