// ABOUTME: Input neutralization for untrusted text embedded in model prompts
// ABOUTME: Entity decoding, control stripping, injection-phrase redaction, trimming and truncation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Sanitization
//!
//! Every piece of caller-supplied text passes through [`Sanitizer::sanitize`]
//! before it reaches a prompt. The function is total and deterministic:
//!
//! 1. Cap the raw input, then decode HTML entities and strip C0 control
//!    characters (tab, LF and CR excepted) repeatedly until neither changes
//!    the text, so `&amp;lt;` and entities split by control characters are
//!    both resolved before matching
//! 2. Apply the ordered redaction rules ([`rules::INJECTION_DENYLIST`] by default)
//! 3. Trim surrounding whitespace
//! 4. When the text was longer than 2000 characters before trimming, cut it
//!    and append `...`
//!
//! A truncated result is either exactly 2003 characters or at most 2000, so
//! `sanitize(sanitize(x)) == sanitize(x)` holds for any input whose entity
//! nesting resolves within the decode round limit.

/// Conversation history bounding and re-sanitization
pub mod history;
/// Problem-name validation
pub mod problem_name;
/// Redaction rule strategy and the default denylist
pub mod rules;

pub use history::{sanitize_history, SanitizedHistory};
pub use problem_name::{validate_problem_name, ProblemNameError};
pub use rules::{PhraseRule, SanitizationRule};

use std::borrow::Cow;
use std::fmt;

use coach_core::constants::limits::{
    MAX_ENTITY_DECODE_ROUNDS, MAX_INPUT_CHARS, MAX_RAW_INPUT_CHARS, TRUNCATION_SUFFIX,
};
use html_escape::decode_html_entities;

use crate::utils::text::{preview, truncate_with_ellipsis};

/// Ordered rule pipeline applied to every free-text field
pub struct Sanitizer {
    rules: Vec<Box<dyn SanitizationRule>>,
    max_chars: usize,
}

impl Sanitizer {
    /// Create a sanitizer with an explicit rule list
    #[must_use]
    pub fn new(rules: Vec<Box<dyn SanitizationRule>>) -> Self {
        Self {
            rules,
            max_chars: MAX_INPUT_CHARS,
        }
    }

    /// Create a sanitizer with the default injection denylist
    ///
    /// # Errors
    ///
    /// Returns an error if a denylist phrase fails to compile
    pub fn standard() -> Result<Self, regex::Error> {
        Ok(Self::new(rules::denylist_rules()?))
    }

    /// Append a rule after the existing ones
    #[must_use]
    pub fn with_rule(mut self, rule: impl SanitizationRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Number of configured rules
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Neutralize `text` for embedding in a prompt
    #[must_use]
    pub fn sanitize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let capped = truncate_with_ellipsis(text, MAX_RAW_INPUT_CHARS);
        let mut current = decode_and_strip(&capped);

        for rule in &self.rules {
            let rewritten = match rule.apply(&current) {
                Cow::Borrowed(_) => None,
                Cow::Owned(text) => Some(text),
            };
            if let Some(text) = rewritten {
                current = text;
            }
        }

        trim_and_truncate(&current, self.max_chars)
    }
}

impl fmt::Debug for Sanitizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sanitizer")
            .field("rules", &self.rules.len())
            .field("max_chars", &self.max_chars)
            .finish()
    }
}

/// C0 control characters and DEL, excluding tab, line feed and carriage return
#[must_use]
pub const fn is_stripped_control(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{7f}')
}

/// Remove stripped control characters, borrowing when there are none
#[must_use]
pub fn strip_control_chars(text: &str) -> Cow<'_, str> {
    if text.chars().any(is_stripped_control) {
        Cow::Owned(text.chars().filter(|c| !is_stripped_control(*c)).collect())
    } else {
        Cow::Borrowed(text)
    }
}

/// Trim `text`, marking it truncated when it exceeded `max_chars` before trimming
///
/// The kept text is `max_chars` characters when enough remain after trimming.
/// Otherwise it is cut to leave room for the suffix, keeping the marked result
/// within `max_chars` so a second pass does not cut it again.
fn trim_and_truncate(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() || text.chars().nth(max_chars).is_none() {
        return trimmed.to_owned();
    }

    let kept = if trimmed.chars().nth(max_chars.saturating_sub(1)).is_some() {
        max_chars
    } else {
        max_chars.saturating_sub(TRUNCATION_SUFFIX.len())
    };
    format!("{}{TRUNCATION_SUFFIX}", preview(trimmed, kept))
}

/// Alternate entity decoding and control stripping until the text is stable
fn decode_and_strip(text: &str) -> String {
    let mut current = strip_control_chars(text).into_owned();

    for _ in 0..MAX_ENTITY_DECODE_ROUNDS {
        let next = {
            let decoded = decode_html_entities(&current);
            strip_control_chars(&decoded).into_owned()
        };
        if next == current {
            break;
        }
        current = next;
    }

    current
}
