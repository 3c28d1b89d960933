// ABOUTME: Pluggable redaction rules applied by the sanitizer in a fixed order
// ABOUTME: Ships the case-insensitive prompt-injection phrase denylist as the default rule set
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::borrow::Cow;
use std::fmt;

use coach_core::constants::markers::REDACTED;
use regex::{Regex, RegexBuilder};

/// Role-override and instruction-hijack phrases, applied in this order
pub const INJECTION_DENYLIST: &[&str] = &[
    "ignore previous instructions",
    "ignore above",
    "ignore all previous",
    "forget everything",
    "new instructions",
    "act as",
    "pretend to be",
    "you are now",
    "system prompt",
    "ignore the above",
    "disregard previous",
    "ignore all above",
    "new system",
    "override",
    "bypass",
    "ignore safety",
    "ignore content policy",
    "ignore guidelines",
    "ignore rules",
    "ignore restrictions",
    "you must",
    "you should",
    "you will",
    "change your role",
    "stop being",
    "become",
    "now you are",
    "from now on",
    "starting now",
    "forget your",
    "disregard your",
    "ignore your",
];

/// A single text rewrite step of the sanitizer
///
/// Rules run in sequence and each one sees the output of the previous one.
/// Implementations must not insert text that a later rule could match, or
/// sanitization stops being idempotent.
pub trait SanitizationRule: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Rewrite `text`, borrowing when nothing matched
    fn apply<'a>(&self, text: &'a str) -> Cow<'a, str>;
}

/// Case-insensitive phrase replaced by a fixed marker
///
/// Words in the phrase match across any run of whitespace, so
/// `"act\n  as"` is caught as well as `"ACT AS"`.
pub struct PhraseRule {
    phrase: String,
    pattern: Regex,
    replacement: &'static str,
}

impl PhraseRule {
    /// Build a rule that replaces `phrase` with the redaction marker
    ///
    /// # Errors
    ///
    /// Returns an error if the compiled pattern exceeds regex size limits
    pub fn new(phrase: &str) -> Result<Self, regex::Error> {
        Self::with_replacement(phrase, REDACTED)
    }

    /// Build a rule with a custom replacement
    ///
    /// # Errors
    ///
    /// Returns an error if the compiled pattern exceeds regex size limits
    pub fn with_replacement(phrase: &str, replacement: &'static str) -> Result<Self, regex::Error> {
        let pattern = phrase
            .split_whitespace()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(r"\s+");
        let pattern = RegexBuilder::new(&pattern).case_insensitive(true).build()?;

        Ok(Self {
            phrase: phrase.to_owned(),
            pattern,
            replacement,
        })
    }
}

impl SanitizationRule for PhraseRule {
    fn name(&self) -> &str {
        &self.phrase
    }

    fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.pattern.replace_all(text, self.replacement)
    }
}

impl fmt::Debug for PhraseRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhraseRule")
            .field("phrase", &self.phrase)
            .field("replacement", &self.replacement)
            .finish_non_exhaustive()
    }
}

/// Compile the default denylist into rules
///
/// # Errors
///
/// Returns an error if any phrase fails to compile
pub fn denylist_rules() -> Result<Vec<Box<dyn SanitizationRule>>, regex::Error> {
    INJECTION_DENYLIST
        .iter()
        .map(|phrase| PhraseRule::new(phrase).map(|rule| Box::new(rule) as Box<dyn SanitizationRule>))
        .collect()
}
