// ABOUTME: CORS layer configuration for the coaching API
// ABOUTME: Builds a tower-http CorsLayer from the configured origin list, or none when unset
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use http::header::{ACCEPT, CONTENT_TYPE, ORIGIN};
use http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::config::CorsConfig;

/// Configure CORS from `CORS_ALLOWED_ORIGINS`
///
/// Returns `None` when no origins are configured, which leaves cross-origin
/// browser requests blocked. `*` allows any origin.
///
/// ```bash
/// export CORS_ALLOWED_ORIGINS="https://leetcode.com,https://coach.example.com"
/// ```
#[must_use]
pub fn setup_cors(config: &CorsConfig) -> Option<CorsLayer> {
    if config.allowed_origins.is_empty() {
        return None;
    }

    let allow_origin = if config.allowed_origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| {
                HeaderValue::from_str(origin)
                    .inspect_err(|_| warn!(origin = %origin, "Ignoring invalid CORS origin"))
                    .ok()
            })
            .collect();

        if origins.is_empty() {
            return None;
        }
        AllowOrigin::list(origins)
    };

    info!(origins = ?config.allowed_origins, "CORS enabled");

    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_headers([
                CONTENT_TYPE,
                ACCEPT,
                ORIGIN,
                HeaderName::from_static("x-requested-with"),
                HeaderName::from_static("x-request-id"),
            ])
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .expose_headers([
                HeaderName::from_static("x-request-id"),
                HeaderName::from_static("retry-after"),
                HeaderName::from_static("x-ratelimit-remaining"),
            ]),
    )
}
