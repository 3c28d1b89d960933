// ABOUTME: Main library entry point for the LeetCode coaching gateway
// ABOUTME: Hardened request pipeline between coding-interview students and a generative model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # LeetCode Coach
//!
//! An HTTP gateway that coaches users through coding-interview problems with
//! hints and follow-up conversation, backed by a hosted language model.
//!
//! ## Pipeline
//!
//! Every request to `POST /get_hint` or `POST /conversation` passes through:
//!
//! - **Rate limiting**: sliding window per client and endpoint
//! - **Validation**: JSON shape, required fields, problem-name charset, type tags
//! - **Sanitization**: entity decoding, control stripping, injection-phrase redaction
//! - **History bounding**: at most ten re-sanitized past turns
//! - **Prompt assembly**: validated templates with single-pass substitution
//! - **Response parsing**: hint and practice suggestion split, empty output as a block
//!
//! ## Quick Start
//!
//! ```bash
//! export GEMINI_API_KEY=...
//! cargo run --bin coach-server -- --http-port 5000
//! ```

/// Environment-based configuration
pub mod config;

/// Model provider abstraction, prompt templates and response parsing
pub mod llm;

/// Structured logging setup
pub mod logging;

/// HTTP middleware for client keys, rate limiting and CORS
pub mod middleware;

/// Request and response data types
pub mod models;

/// Sliding-window rate limiter
pub mod rate_limiting;

/// Shared server resources
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// Input sanitization, problem-name validation and history bounding
pub mod sanitization;

/// Security response headers
pub mod security;

/// HTTP server assembly and lifecycle
pub mod server;

/// Coaching pipeline service
pub mod services;

/// Text helpers
pub mod utils;

pub use coach_core::errors::{AppError, AppResult, ErrorCode};
