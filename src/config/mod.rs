// ABOUTME: Configuration module for the coach server
// ABOUTME: Environment-variable driven settings for HTTP, model access and rate limiting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Environment-based server configuration
pub mod environment;

pub use environment::{
    ApiKey, CorsConfig, EndpointLimit, Environment, LlmConfig, RateLimitConfig, ServerConfig,
};
