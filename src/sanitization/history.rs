// ABOUTME: Bounds and re-sanitizes client-supplied conversation history on every request
// ABOUTME: Accepts arbitrary JSON, keeps at most the first ten well-formed non-empty turns in order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::slice::Iter;

use coach_core::constants::limits::MAX_HISTORY_ENTRIES;
use serde_json::Value;

use super::Sanitizer;
use crate::models::{ConversationInteraction, MessageType};

/// Ordered history of at most ten sanitized interactions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizedHistory(Vec<ConversationInteraction>);

impl SanitizedHistory {
    /// Number of kept interactions
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no interaction was kept
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate kept interactions in original order
    pub fn iter(&self) -> Iter<'_, ConversationInteraction> {
        self.0.iter()
    }

    /// Kept interactions as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[ConversationInteraction] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a SanitizedHistory {
    type Item = &'a ConversationInteraction;
    type IntoIter = Iter<'a, ConversationInteraction>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Build a bounded, sanitized history from untrusted client JSON
///
/// Only the first ten array elements are looked at. Elements that are not
/// objects are skipped, non-string text fields count as empty, and an entry
/// survives only if both `userInput` and `botResponse` are non-empty after
/// sanitization. An unrecognized `messageType` is dropped from the entry.
#[must_use]
pub fn sanitize_history(sanitizer: &Sanitizer, raw: Option<&Value>) -> SanitizedHistory {
    let Some(Value::Array(entries)) = raw else {
        return SanitizedHistory::default();
    };

    let kept = entries
        .iter()
        .take(MAX_HISTORY_ENTRIES)
        .filter_map(Value::as_object)
        .filter_map(|entry| {
            let text = |key: &str| {
                entry
                    .get(key)
                    .and_then(Value::as_str)
                    .map(|value| sanitizer.sanitize(value))
                    .unwrap_or_default()
            };

            let user_input = text("userInput");
            let bot_response = text("botResponse");
            if user_input.is_empty() || bot_response.is_empty() {
                return None;
            }

            let message_type = entry
                .get("messageType")
                .and_then(Value::as_str)
                .and_then(MessageType::parse);

            Some(ConversationInteraction {
                user_input,
                bot_response,
                message_type,
            })
        })
        .collect();

    SanitizedHistory(kept)
}
