// ABOUTME: Shared server resources handed to every route and middleware
// ABOUTME: Owns configuration, the sanitizer, the prompt catalog, the rate limiter and the model provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Server Resources
//!
//! Everything a request needs is built once at startup and shared through an
//! `Arc<ServerResources>`. Construction validates the prompt catalog and
//! compiles the sanitization rules, so a broken template or rule stops the
//! server before it binds.

use std::fmt;
use std::sync::Arc;

use coach_core::errors::{AppError, AppResult};

use crate::config::ServerConfig;
use crate::llm::prompts::PromptCatalog;
use crate::llm::LlmProvider;
use crate::rate_limiting::SlidingWindowRateLimiter;
use crate::sanitization::Sanitizer;
use crate::security::SecurityConfig;

/// Centralized resource container for dependency injection
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Input sanitizer
    pub sanitizer: Arc<Sanitizer>,
    /// Validated prompt templates
    pub catalog: Arc<PromptCatalog>,
    /// Shared sliding-window limiter
    pub rate_limiter: SlidingWindowRateLimiter,
    /// Model collaborator
    pub llm: Arc<dyn LlmProvider>,
    /// Response security headers
    pub security: SecurityConfig,
}

impl ServerResources {
    /// Build resources from configuration and a model provider
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a sanitization rule fails to compile
    /// or a prompt template is inconsistent
    pub fn new(config: ServerConfig, llm: Arc<dyn LlmProvider>) -> AppResult<Self> {
        let sanitizer = Sanitizer::standard().map_err(|e| {
            AppError::config(format!("Invalid sanitization rule: {e}")).with_source(e)
        })?;
        let catalog = PromptCatalog::load()?;
        let rate_limiter = SlidingWindowRateLimiter::new(config.rate_limit.clone());
        let security = SecurityConfig::from_environment(config.environment);

        Ok(Self {
            config: Arc::new(config),
            sanitizer: Arc::new(sanitizer),
            catalog: Arc::new(catalog),
            rate_limiter,
            llm,
            security,
        })
    }
}

impl fmt::Debug for ServerResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerResources")
            .field("config", &self.config)
            .field("sanitizer_rules", &self.sanitizer.rule_count())
            .field("llm", &self.llm.name())
            .field("tracked_rate_windows", &self.rate_limiter.tracked_keys())
            .finish_non_exhaustive()
    }
}
