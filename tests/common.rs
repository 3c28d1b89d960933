// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides a scripted model provider and server resource builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `leetcode_coach`

use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use leetcode_coach::config::{Environment, ServerConfig};
use leetcode_coach::llm::{CompletionError, CompletionRequest, CompletionResponse, LlmProvider};
use leetcode_coach::resources::ServerResources;
use leetcode_coach::server::build_router;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("warn")
            .with_test_writer()
            .try_init();
    });
}

/// What the stub model does on every call
#[derive(Debug, Clone)]
pub enum StubReply {
    /// Return this text
    Text(String),
    /// Report a safety block
    Blocked,
    /// Report a provider failure
    Upstream,
    /// Never answer within any reasonable timeout
    Hang,
}

/// Model provider that replays a fixed reply and records prompts
#[derive(Debug)]
pub struct StubProvider {
    reply: StubReply,
    prompts: Mutex<Vec<String>>,
}

impl StubProvider {
    pub fn new(reply: StubReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn text(reply: &str) -> Arc<Self> {
        Self::new(StubReply::Text(reply.to_owned()))
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Most recent prompt
    pub fn last_prompt(&self) -> String {
        self.prompts().pop().expect("no prompt was sent")
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn display_name(&self) -> &'static str {
        "Stub Provider"
    }

    fn default_model(&self) -> &str {
        "stub-model"
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        self.prompts.lock().unwrap().push(request.prompt.clone());

        match &self.reply {
            StubReply::Text(text) => Ok(CompletionResponse {
                content: text.clone(),
                model: "stub-model".to_owned(),
                usage: None,
                finish_reason: Some("STOP".to_owned()),
            }),
            StubReply::Blocked => Err(CompletionError::Blocked {
                reason: "SAFETY".to_owned(),
            }),
            StubReply::Upstream => Err(CompletionError::Upstream {
                status: Some(503),
                message: "secret upstream detail".to_owned(),
            }),
            StubReply::Hang => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Err(CompletionError::transport("unreachable"))
            }
        }
    }
}

/// Configuration used by route tests
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig {
        environment: Environment::Testing,
        ..ServerConfig::default()
    };
    config.llm.timeout = Duration::from_secs(5);
    config
}

/// Build shared resources around a provider
pub fn create_test_resources(
    config: ServerConfig,
    provider: Arc<StubProvider>,
) -> Arc<ServerResources> {
    init_test_logging();
    Arc::new(ServerResources::new(config, provider).expect("resources should build"))
}

/// Full application router with default test configuration
pub fn test_router(provider: Arc<StubProvider>) -> Router {
    build_router(&create_test_resources(test_config(), provider))
}

/// Full application router with a custom configuration
pub fn test_router_with_config(config: ServerConfig, provider: Arc<StubProvider>) -> Router {
    build_router(&create_test_resources(config, provider))
}
