// ABOUTME: Coaching pipeline behind the hint and conversation endpoints
// ABOUTME: Validates fields, sanitizes input and history, assembles the prompt, calls the model and parses the reply
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Coaching Service
//!
//! Protocol-agnostic request pipeline. The HTTP layer hands over a parsed
//! JSON object; everything from field checks to response parsing happens
//! here, in this order:
//!
//! 1. required fields present
//! 2. problem name valid
//! 3. type tag in the endpoint's allowed set
//! 4. free text and history sanitized
//! 5. prompt assembled
//! 6. model invoked under a timeout
//! 7. reply parsed, or the failure mapped to a generic error

use std::sync::Arc;
use std::time::Instant;

use coach_core::constants::limits::{LOG_PREVIEW_MESSAGE_CHARS, LOG_PREVIEW_PROBLEM_CHARS};
use coach_core::constants::messages;
use coach_core::errors::{AppError, AppResult};
use serde_json::{Map, Value};
use tracing::{debug, error, instrument};

use crate::llm::prompts::{PromptInputs, PromptKind};
use crate::llm::response::{parse_conversation, parse_hint};
use crate::llm::{CompletionError, CompletionRequest};
use crate::logging::AppLogger;
use crate::models::{
    ConversationRequest, ConversationResponse, HintRequest, HintRequestType, HintResponse,
    MessageType,
};
use crate::resources::ServerResources;
use crate::sanitization::{sanitize_history, validate_problem_name, SanitizedHistory};
use crate::utils::text::preview;

/// Wire names of request fields
mod fields {
    pub const PROBLEM_NAME: &str = "problemName";
    pub const CONTEXT: &str = "context";
    pub const MESSAGE: &str = "message";
    /// Free-form: anything other than an array yields no history
    pub const HISTORY: &str = "conversationHistory";
    pub const REQUEST_TYPE: &str = "requestType";
    pub const MESSAGE_TYPE: &str = "messageType";
}

/// Read an optional string field; `null` counts as absent
fn optional_str<'a>(body: &'a Map<String, Value>, key: &str) -> AppResult<Option<&'a str>> {
    match body.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(_) => Err(AppError::malformed(format!("Field '{key}' must be a string"))),
    }
}

/// Coaching pipeline bound to shared server resources
#[derive(Clone)]
pub struct CoachingService {
    resources: Arc<ServerResources>,
}

impl CoachingService {
    /// Create a service over `resources`
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Validate and sanitize a `/get_hint` body
    ///
    /// # Errors
    ///
    /// Returns the first validation failure in pipeline order
    pub fn prepare_hint(
        &self,
        body: &Map<String, Value>,
    ) -> AppResult<(HintRequest, SanitizedHistory)> {
        let problem_name = optional_str(body, fields::PROBLEM_NAME)?;
        let context = optional_str(body, fields::CONTEXT)?;
        let request_type = optional_str(body, fields::REQUEST_TYPE)?;

        let problem_name = problem_name
            .ok_or_else(|| AppError::missing_field(messages::PROBLEM_NAME_NOT_PROVIDED))?;
        let problem_name = validate_problem_name(problem_name)?;

        let request_type = match request_type {
            None => HintRequestType::default(),
            Some(tag) => HintRequestType::parse(tag)
                .ok_or_else(|| AppError::invalid_type(messages::INVALID_REQUEST_TYPE))?,
        };

        let sanitizer = &self.resources.sanitizer;
        let request = HintRequest {
            problem_name: sanitizer.sanitize(problem_name),
            context: context.map(|text| sanitizer.sanitize(text)).unwrap_or_default(),
            request_type,
        };
        Ok((request, sanitize_history(sanitizer, body.get(fields::HISTORY))))
    }

    /// Validate and sanitize a `/conversation` body
    ///
    /// # Errors
    ///
    /// Returns the first validation failure in pipeline order
    pub fn prepare_conversation(
        &self,
        body: &Map<String, Value>,
    ) -> AppResult<(ConversationRequest, SanitizedHistory)> {
        let message = optional_str(body, fields::MESSAGE)?;
        let problem_name = optional_str(body, fields::PROBLEM_NAME)?;
        let message_type = optional_str(body, fields::MESSAGE_TYPE)?;

        let message = message
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| AppError::missing_field(messages::MESSAGE_NOT_PROVIDED))?;
        let problem_name = problem_name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::missing_field(messages::PROBLEM_NAME_NOT_PROVIDED))?;

        let problem_name = validate_problem_name(problem_name)?;

        let message_type = match message_type {
            None => MessageType::default(),
            Some(tag) => MessageType::parse(tag)
                .ok_or_else(|| AppError::invalid_type(messages::INVALID_MESSAGE_TYPE))?,
        };

        let sanitizer = &self.resources.sanitizer;
        let message = sanitizer.sanitize(message);
        if message.is_empty() {
            return Err(AppError::missing_field(messages::MESSAGE_NOT_PROVIDED));
        }

        let request = ConversationRequest {
            problem_name: sanitizer.sanitize(problem_name),
            message,
            message_type,
        };
        Ok((request, sanitize_history(sanitizer, body.get(fields::HISTORY))))
    }

    /// Run the hint pipeline for a JSON body
    ///
    /// # Errors
    ///
    /// Returns a validation error, `ModelBlocked`, or a generic upstream failure
    #[instrument(skip(self, body), fields(endpoint = "hint"))]
    pub async fn get_hint(&self, body: &Map<String, Value>) -> AppResult<HintResponse> {
        let (request, history) = self.prepare_hint(body)?;
        debug!(
            problem = %preview(&request.problem_name, LOG_PREVIEW_PROBLEM_CHARS),
            request_type = request.request_type.as_str(),
            history_len = history.len(),
            "Hint request"
        );

        let kind = PromptKind::Hint(request.request_type);
        let prompt = self.resources.catalog.assemble(
            kind,
            &PromptInputs {
                problem_name: &request.problem_name,
                user_context: &request.context,
                user_message: "",
                history: &history,
            },
        )?;

        let raw = self.complete(kind, prompt).await?;
        let parsed = parse_hint(&raw)?;
        Ok(HintResponse {
            hint: parsed.primary,
            practice_problem: parsed.secondary,
        })
    }

    /// Run the conversation pipeline for a JSON body
    ///
    /// # Errors
    ///
    /// Returns a validation error, `ModelBlocked`, or a generic upstream failure
    #[instrument(skip(self, body), fields(endpoint = "conversation"))]
    pub async fn converse(&self, body: &Map<String, Value>) -> AppResult<ConversationResponse> {
        let (request, history) = self.prepare_conversation(body)?;
        debug!(
            problem = %preview(&request.problem_name, LOG_PREVIEW_PROBLEM_CHARS),
            message = %preview(&request.message, LOG_PREVIEW_MESSAGE_CHARS),
            message_type = request.message_type.as_str(),
            history_len = history.len(),
            "Conversation request"
        );

        let kind = PromptKind::Conversation(request.message_type);
        let prompt = self.resources.catalog.assemble(
            kind,
            &PromptInputs {
                problem_name: &request.problem_name,
                user_context: "",
                user_message: &request.message,
                history: &history,
            },
        )?;

        let raw = self.complete(kind, prompt).await?;
        Ok(ConversationResponse {
            response: parse_conversation(&raw)?,
        })
    }

    /// Invoke the model with an upper bound on wall time
    async fn complete(&self, kind: PromptKind, prompt: String) -> AppResult<String> {
        let llm_config = &self.resources.config.llm;
        let request = CompletionRequest::new(prompt)
            .with_temperature(llm_config.temperature)
            .with_max_output_tokens(llm_config.max_output_tokens);

        let started = Instant::now();
        let outcome = tokio::time::timeout(llm_config.timeout, self.resources.llm.complete(&request))
            .await
            .unwrap_or(Err(CompletionError::Timeout(llm_config.timeout)));
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        AppLogger::log_model_call(
            kind.endpoint().as_str(),
            kind.tag(),
            self.resources.llm.default_model(),
            outcome.is_ok(),
            duration_ms,
        );

        match outcome {
            Ok(response) => Ok(response.content),
            Err(failure) => {
                if !matches!(failure, CompletionError::Blocked { .. }) {
                    error!(error = %failure, provider = self.resources.llm.name(), "Model call failed");
                }
                Err(failure.into())
            }
        }
    }
}
