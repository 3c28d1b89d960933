// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Pure data constants for limits, routes, markers and messages of the coach pipeline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single
//! large namespace.

/// Rate limiting defaults per endpoint
pub mod rate_limits;

/// Input and output size limits enforced by the pipeline
pub mod limits {
    /// Maximum characters kept from any sanitized free-text field
    pub const MAX_INPUT_CHARS: usize = 2000;
    /// Raw input is capped at this many characters before entity decoding
    pub const MAX_RAW_INPUT_CHARS: usize = MAX_INPUT_CHARS * 4;
    /// Maximum characters in a problem name
    pub const MAX_PROBLEM_NAME_CHARS: usize = 100;
    /// Maximum conversation interactions considered per request
    pub const MAX_HISTORY_ENTRIES: usize = 10;
    /// Maximum characters of raw model output accepted for parsing
    pub const MAX_MODEL_OUTPUT_CHARS: usize = 5000;
    /// Marker appended to truncated text
    pub const TRUNCATION_SUFFIX: &str = "...";
    /// Upper bound on entity decode passes in the sanitizer
    pub const MAX_ENTITY_DECODE_ROUNDS: usize = 16;
    /// Default maximum request body size in bytes
    pub const DEFAULT_MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;
    /// Characters of the problem name included in log previews
    pub const LOG_PREVIEW_PROBLEM_CHARS: usize = 50;
    /// Characters of user text included in log previews
    pub const LOG_PREVIEW_MESSAGE_CHARS: usize = 100;
}

/// API routes
pub mod routes {
    /// Hint endpoint
    pub const GET_HINT: &str = "/get_hint";
    /// Conversation endpoint
    pub const CONVERSATION: &str = "/conversation";
    /// Health route
    pub const HEALTH: &str = "/health";
    /// Readiness route
    pub const READY: &str = "/ready";
}

/// Network defaults
pub mod ports {
    /// Default HTTP host
    pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 5000;
}

/// Generative model defaults
pub mod llm {
    /// Default Gemini model
    pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
    /// Base URL for the Gemini API
    pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
    /// Deterministic generation
    pub const DEFAULT_TEMPERATURE: f32 = 0.0;
    /// Upper bound on one model round trip
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
}

/// Literal markers injected into or recognized in text
pub mod markers {
    /// Replacement for redacted injection phrases
    pub const REDACTED: &str = "[REDACTED]";
    /// Delimiter the model uses before a practice suggestion
    pub const PRACTICE_DELIMITER: &str = "\nTo practice this pattern, try: ";
    /// Prefix of a reconstructed practice suggestion
    pub const PRACTICE_PREFIX: &str = "To practice this pattern, try: ";
    /// Lowercased phrase the model uses when it does not know a problem
    pub const UNFAMILIAR_PROBLEM: &str = "i'm not familiar with that problem";
    /// Rendered when the caller gave no context
    pub const NO_CONTEXT: &str = "No additional context provided";
    /// Rendered when there are no previous hints
    pub const NO_PREVIOUS_HINTS: &str = "No previous hints";
    /// Rendered when there is no prior conversation
    pub const NO_PREVIOUS_CONVERSATION: &str = "No previous conversation.";
}

/// User-facing error messages
pub mod messages {
    /// `problemName` absent
    pub const PROBLEM_NAME_NOT_PROVIDED: &str = "Problem name not provided";
    /// `message` absent or blank
    pub const MESSAGE_NOT_PROVIDED: &str = "Message not provided";
    /// Problem name empty
    pub const PROBLEM_NAME_EMPTY: &str = "Problem name cannot be empty";
    /// Problem name outside the allowed character set
    pub const PROBLEM_NAME_INVALID: &str = "Invalid problem name format";
    /// Problem name over the length limit
    pub const PROBLEM_NAME_TOO_LONG: &str = "Problem name too long";
    /// Body is not a JSON object
    pub const INVALID_JSON: &str = "Request body must be a valid JSON object";
    /// Body over the size limit
    pub const PAYLOAD_TOO_LARGE: &str = "Request body is too large";
    /// Content type is not JSON
    pub const UNSUPPORTED_CONTENT_TYPE: &str = "Content-Type must be application/json";
    /// `requestType` outside the allowed set
    pub const INVALID_REQUEST_TYPE: &str = "Invalid requestType";
    /// `messageType` outside the allowed set
    pub const INVALID_MESSAGE_TYPE: &str = "Invalid messageType";
    /// Caller exceeded the rate limit
    pub const RATE_LIMITED: &str = "Too many requests. Please wait a moment before trying again.";
    /// Model refused to answer
    pub const MODEL_BLOCKED: &str =
        "The coach could not answer that request. Please rephrase your question and try again.";
    /// Generic upstream failure
    pub const UPSTREAM_FAILURE: &str =
        "I'm sorry, I encountered an error. Please try again in a moment.";
    /// Generic internal failure
    pub const INTERNAL_ERROR: &str = "An internal server error occurred";
}
