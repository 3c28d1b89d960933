// ABOUTME: Problem-name validation against a strict character set and length limit
// ABOUTME: Rejects empty, malformed and oversized names before any prompt is built
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use coach_core::constants::limits::MAX_PROBLEM_NAME_CHARS;
use coach_core::constants::messages;
use coach_core::errors::{AppError, ErrorCode};
use thiserror::Error;

/// Reason a problem name was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProblemNameError {
    /// Name is empty
    #[error("Problem name cannot be empty")]
    Empty,
    /// Name contains a character outside `A-Z a-z 0-9 space - _ . , ( ) #`
    #[error("Invalid problem name format")]
    InvalidFormat,
    /// Name is longer than 100 characters
    #[error("Problem name too long")]
    TooLong,
}

impl From<ProblemNameError> for AppError {
    fn from(error: ProblemNameError) -> Self {
        match error {
            ProblemNameError::Empty => Self::new(ErrorCode::EmptyInput, messages::PROBLEM_NAME_EMPTY),
            ProblemNameError::InvalidFormat => {
                Self::new(ErrorCode::InvalidFormat, messages::PROBLEM_NAME_INVALID)
            }
            ProblemNameError::TooLong => Self::new(ErrorCode::TooLong, messages::PROBLEM_NAME_TOO_LONG),
        }
    }
}

const fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.' | ',' | '(' | ')' | '#')
}

/// Validate a problem name, returning it unchanged on success
///
/// Checks run in order: emptiness, character set, length.
///
/// # Errors
///
/// Returns the first failed check as a [`ProblemNameError`]
pub fn validate_problem_name(name: &str) -> Result<&str, ProblemNameError> {
    if name.is_empty() {
        return Err(ProblemNameError::Empty);
    }
    if !name.chars().all(is_allowed_char) {
        return Err(ProblemNameError::InvalidFormat);
    }
    if name.chars().count() > MAX_PROBLEM_NAME_CHARS {
        return Err(ProblemNameError::TooLong);
    }
    Ok(name)
}
