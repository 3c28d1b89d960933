// ABOUTME: Turns raw model text into hint/practice pairs and conversation replies
// ABOUTME: Caps output length, treats empty output as a block and splits on the practice delimiter
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::borrow::Cow;

use coach_core::constants::limits::MAX_MODEL_OUTPUT_CHARS;
use coach_core::constants::markers::{PRACTICE_DELIMITER, PRACTICE_PREFIX, UNFAMILIAR_PROBLEM};
use coach_core::errors::AppError;
use thiserror::Error;

use crate::utils::text::truncate_with_ellipsis;

/// Model output that cannot be shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    /// Output was empty or whitespace only
    #[error("model returned no usable text")]
    Blocked,
}

impl From<ResponseError> for AppError {
    fn from(error: ResponseError) -> Self {
        Self::model_blocked().with_source(error)
    }
}

/// Parsed hint: the coaching text and an optional practice suggestion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedModelResponse {
    /// Hint text
    pub primary: String,
    /// `To practice this pattern, try: ...` or empty
    pub secondary: String,
}

/// Cap raw output and reject empty text
///
/// The capped text is returned untrimmed so the practice delimiter keeps its
/// leading newline when it opens the reply.
fn bounded(raw: &str) -> Result<Cow<'_, str>, ResponseError> {
    let capped = truncate_with_ellipsis(raw, MAX_MODEL_OUTPUT_CHARS);
    if capped.trim().is_empty() {
        return Err(ResponseError::Blocked);
    }
    Ok(capped)
}

/// Parse a `/get_hint` model reply
///
/// # Errors
///
/// Returns [`ResponseError::Blocked`] when the reply is empty
pub fn parse_hint(raw: &str) -> Result<ParsedModelResponse, ResponseError> {
    let text = bounded(raw)?;

    if text.to_lowercase().contains(UNFAMILIAR_PROBLEM) {
        return Ok(ParsedModelResponse {
            primary: text.trim().to_owned(),
            secondary: String::new(),
        });
    }

    Ok(match text.split_once(PRACTICE_DELIMITER) {
        Some((hint, practice)) => ParsedModelResponse {
            primary: hint.trim().to_owned(),
            secondary: format!("{PRACTICE_PREFIX}{}", practice.trim()),
        },
        None => ParsedModelResponse {
            primary: text.trim().to_owned(),
            secondary: String::new(),
        },
    })
}

/// Parse a `/conversation` model reply
///
/// # Errors
///
/// Returns [`ResponseError::Blocked`] when the reply is empty
pub fn parse_conversation(raw: &str) -> Result<String, ResponseError> {
    Ok(bounded(raw)?.trim().to_owned())
}
