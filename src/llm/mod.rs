// ABOUTME: LLM provider abstraction for single-prompt text completion
// ABOUTME: Defines the provider contract and an explicit result type for model failure kinds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # LLM Provider Interface
//!
//! The coach sends one fully assembled prompt per request and expects plain
//! text back. Providers report failures through [`CompletionError`], which
//! keeps a safety block apart from transient upstream trouble so callers
//! never retry a refusal.
//!
//! ## Example: Using a Provider
//!
//! ```rust,no_run
//! use leetcode_coach::llm::{CompletionRequest, LlmProvider};
//!
//! async fn example(provider: &dyn LlmProvider) {
//!     let request = CompletionRequest::new("Give me a hint for Two Sum")
//!         .with_temperature(0.0);
//!     let response = provider.complete(&request).await;
//! }
//! ```

mod gemini;
pub mod prompts;
pub mod response;

pub use gemini::GeminiProvider;

use std::time::Duration;

use async_trait::async_trait;
use coach_core::errors::AppError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Request / Response Types
// ============================================================================

/// One text completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Fully assembled prompt
    pub prompt: String,
    /// Model override (uses the provider default if `None`)
    pub model: Option<String>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Output token cap
    pub max_output_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Create a request for `prompt` with provider defaults
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            temperature: None,
            max_output_tokens: None,
        }
    }

    /// Set the model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the output token cap
    #[must_use]
    pub const fn with_max_output_tokens(mut self, max_output_tokens: Option<u32>) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt tokens
    pub prompt_tokens: u32,
    /// Generated tokens
    pub completion_tokens: u32,
    /// Total tokens
    pub total_tokens: u32,
}

/// Generated text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text, possibly empty
    pub content: String,
    /// Model that produced it
    pub model: String,
    /// Token usage, when reported
    pub usage: Option<TokenUsage>,
    /// Provider finish reason
    pub finish_reason: Option<String>,
}

// ============================================================================
// Failure Kinds
// ============================================================================

/// Why a completion did not produce usable text
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The provider's safety system refused the prompt or the output
    #[error("model blocked the request: {reason}")]
    Blocked {
        /// Provider-reported block reason
        reason: String,
    },
    /// The call exceeded its time budget
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),
    /// Transport error or non-success status from the provider
    #[error("provider error: {message}")]
    Upstream {
        /// HTTP status, when one was received
        status: Option<u16>,
        /// Provider or transport message
        message: String,
    },
    /// The provider answered with a body we could not interpret
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

impl CompletionError {
    /// Upstream error without an HTTP status
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Upstream {
            status: None,
            message: message.into(),
        }
    }
}

impl From<CompletionError> for AppError {
    fn from(error: CompletionError) -> Self {
        match error {
            CompletionError::Blocked { .. } => Self::model_blocked().with_source(error),
            CompletionError::Timeout(_)
            | CompletionError::Upstream { .. }
            | CompletionError::MalformedResponse(_) => {
                Self::upstream(error.to_string()).with_source(error)
            }
        }
    }
}

// ============================================================================
// Provider Trait
// ============================================================================

/// Text completion provider
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Unique provider identifier (e.g., "gemini")
    fn name(&self) -> &'static str;

    /// Human-readable provider name
    fn display_name(&self) -> &'static str;

    /// Model used when the request does not name one
    fn default_model(&self) -> &str;

    /// Complete one prompt
    ///
    /// An empty `content` with no block reason is returned as success; the
    /// response parser treats it as a block.
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError>;
}
