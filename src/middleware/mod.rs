// ABOUTME: HTTP middleware for client identification, rate limiting, body limits and CORS
// ABOUTME: Layers applied around the coaching routes by the server router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// JSON body for oversized requests
pub mod body_limit;
/// Client key derivation for rate limiting
pub mod client_key;
/// CORS configuration
pub mod cors;
/// Rate limiting middleware and headers
pub mod rate_limiting;

pub use body_limit::payload_too_large_middleware;
pub use client_key::client_key;
pub use cors::setup_cors;
pub use rate_limiting::{apply_rate_limit_headers, headers, rate_limit_middleware, RateLimitLayer};
