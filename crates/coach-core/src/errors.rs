// ABOUTME: Unified error handling for the coach gateway with standard error codes
// ABOUTME: Maps pipeline failures to HTTP status codes and a stable JSON error body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Unified Error Handling System
//!
//! Every stage of the request pipeline reports failures as an [`AppError`]
//! carrying an [`ErrorCode`]. The code decides the HTTP status and whether
//! the message may be shown to the caller: validation-class errors are
//! surfaced verbatim, upstream and internal failures are replaced by a fixed
//! generic message and their detail is only logged.

use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::messages;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Request shape
    /// Body is not JSON, not an object, or a field has the wrong type
    #[serde(rename = "MALFORMED_REQUEST")]
    MalformedRequest,
    /// A required field is absent
    #[serde(rename = "MISSING_FIELD")]
    MissingField,
    /// Body exceeds the configured size limit
    #[serde(rename = "PAYLOAD_TOO_LARGE")]
    PayloadTooLarge,

    // Problem name validation
    /// Problem name is empty
    #[serde(rename = "EMPTY_INPUT")]
    EmptyInput,
    /// Problem name contains characters outside the allowed set
    #[serde(rename = "INVALID_FORMAT")]
    InvalidFormat,
    /// Problem name exceeds the length limit
    #[serde(rename = "TOO_LONG")]
    TooLong,

    // Type tags
    /// `requestType` or `messageType` is not in the endpoint's allowed set
    #[serde(rename = "INVALID_TYPE")]
    InvalidType,

    // Throttling
    /// Client exceeded its sliding-window budget
    #[serde(rename = "RATE_LIMITED")]
    RateLimited,

    // Model outcomes
    /// Model produced no text, typically because of a safety filter
    #[serde(rename = "MODEL_BLOCKED")]
    ModelBlocked,
    /// Provider error, timeout or malformed provider response
    #[serde(rename = "UPSTREAM_FAILURE")]
    UpstreamFailure,

    // Server side
    /// Invalid or missing configuration
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError,
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::MalformedRequest
            | Self::MissingField
            | Self::EmptyInput
            | Self::InvalidFormat
            | Self::TooLong
            | Self::InvalidType
            | Self::ModelBlocked => 400,

            Self::PayloadTooLarge => 413,

            Self::RateLimited => 429,

            Self::UpstreamFailure | Self::ConfigError | Self::InternalError => 500,
        }
    }

    /// Stable wire name of the code
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MalformedRequest => "MALFORMED_REQUEST",
            Self::MissingField => "MISSING_FIELD",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::EmptyInput => "EMPTY_INPUT",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::TooLong => "TOO_LONG",
            Self::InvalidType => "INVALID_TYPE",
            Self::RateLimited => "RATE_LIMITED",
            Self::ModelBlocked => "MODEL_BLOCKED",
            Self::UpstreamFailure => "UPSTREAM_FAILURE",
            Self::ConfigError => "CONFIG_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether the error message may be returned to the caller as-is
    #[must_use]
    pub const fn is_client_visible(self) -> bool {
        !matches!(
            self,
            Self::UpstreamFailure | Self::ConfigError | Self::InternalError
        )
    }

    /// Message shown to callers when the original message must stay internal
    #[must_use]
    pub const fn public_message(self) -> &'static str {
        match self {
            Self::UpstreamFailure => messages::UPSTREAM_FAILURE,
            _ => messages::INTERNAL_ERROR,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Message safe to return to the caller
    #[must_use]
    pub fn public_message(&self) -> &str {
        if self.code.is_client_visible() {
            &self.message
        } else {
            self.code.public_message()
        }
    }

    /// Malformed request body
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedRequest, message)
    }

    /// Required field absent
    pub fn missing_field(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MissingField, message)
    }

    /// Request body over the size limit
    #[must_use]
    pub fn payload_too_large() -> Self {
        Self::new(ErrorCode::PayloadTooLarge, messages::PAYLOAD_TOO_LARGE)
    }

    /// Unknown type tag
    pub fn invalid_type(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidType, message)
    }

    /// Rate limit exceeded
    #[must_use]
    pub fn rate_limited() -> Self {
        Self::new(ErrorCode::RateLimited, messages::RATE_LIMITED)
    }

    /// Model blocked the request
    #[must_use]
    pub fn model_blocked() -> Self {
        Self::new(ErrorCode::ModelBlocked, messages::MODEL_BLOCKED)
    }

    /// Upstream model failure; the message is logged, never returned
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamFailure, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response body: `{"error": "...", "code": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Caller-facing message
    pub error: String,
    /// Machine-readable code
    pub code: ErrorCode,
}

impl From<&AppError> for ErrorResponse {
    fn from(error: &AppError) -> Self {
        Self {
            error: error.public_message().to_owned(),
            code: error.code,
        }
    }
}

#[cfg(feature = "http-response")]
mod http_response {
    use axum::response::{IntoResponse, Response};
    use axum::Json;
    use http::StatusCode;
    use tracing::{error, warn};

    use super::{AppError, ErrorResponse};

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = StatusCode::from_u16(self.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

            if self.code.is_client_visible() {
                warn!(code = %self.code, status = status.as_u16(), message = %self.message, "Request rejected");
            } else {
                error!(
                    code = %self.code,
                    status = status.as_u16(),
                    message = %self.message,
                    source = ?self.source,
                    "Request failed"
                );
            }

            (status, Json(ErrorResponse::from(&self))).into_response()
        }
    }
}
