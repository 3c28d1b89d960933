// ABOUTME: Domain types for coaching requests, conversation turns and API responses
// ABOUTME: Closed tag sets for endpoints, hint request types and conversation message types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Core data models shared by the pipeline stages and the HTTP layer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Public endpoint a request arrived on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    /// `POST /conversation`
    Conversation,
    /// `POST /get_hint`
    Hint,
}

impl Endpoint {
    /// Name used in rate-limit keys and logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Conversation => "conversation",
            Self::Hint => "hint",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `requestType` accepted by the hint endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintRequestType {
    /// Opening hint for a problem
    #[default]
    FirstHint,
    /// A different angle after earlier hints
    AnotherHint,
}

impl HintRequestType {
    /// Every hint request type, in catalog order
    pub const ALL: [Self; 2] = [Self::FirstHint, Self::AnotherHint];

    /// Parse a wire tag, `None` when outside the allowed set
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "first_hint" => Some(Self::FirstHint),
            "another_hint" => Some(Self::AnotherHint),
            _ => None,
        }
    }

    /// Wire tag
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstHint => "first_hint",
            Self::AnotherHint => "another_hint",
        }
    }
}

/// `messageType` accepted by the conversation endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Asking for a nudge
    Hint,
    /// Asking for a review of their approach
    Analyze,
    /// Asking for an approach suggestion
    Suggest,
    /// Asking for a concept to be explained
    Explain,
    /// Asking how to improve a working solution
    Optimize,
    /// Anything else
    #[default]
    General,
}

impl MessageType {
    /// Every message type, in catalog order
    pub const ALL: [Self; 6] = [
        Self::Hint,
        Self::Analyze,
        Self::Suggest,
        Self::Explain,
        Self::Optimize,
        Self::General,
    ];

    /// Parse a wire tag, `None` when outside the allowed set
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    /// Wire tag
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hint => "hint",
            Self::Analyze => "analyze",
            Self::Suggest => "suggest",
            Self::Explain => "explain",
            Self::Optimize => "optimize",
            Self::General => "general",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sanitized past turn of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationInteraction {
    /// What the user said
    pub user_input: String,
    /// What the coach answered
    pub bot_response: String,
    /// Tag of the turn, when the client sent a recognized one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<MessageType>,
}

/// Validated and sanitized `/get_hint` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintRequest {
    /// Sanitized problem name
    pub problem_name: String,
    /// Sanitized free-text context, possibly empty
    pub context: String,
    /// Requested hint kind
    pub request_type: HintRequestType,
}

/// Validated and sanitized `/conversation` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRequest {
    /// Sanitized problem name
    pub problem_name: String,
    /// Sanitized latest user message
    pub message: String,
    /// Tag of the latest message
    pub message_type: MessageType,
}

/// `/get_hint` success body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintResponse {
    /// Coaching hint
    pub hint: String,
    /// `To practice this pattern, try: ...` or empty
    pub practice_problem: String,
}

/// `/conversation` success body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationResponse {
    /// Coach reply
    pub response: String,
}
