// ABOUTME: Character-aware text helpers shared by the sanitizer, parser and log previews
// ABOUTME: Truncation counts Unicode scalar values so multi-byte text is never split
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::borrow::Cow;

use coach_core::constants::limits::TRUNCATION_SUFFIX;

/// Truncate `text` to at most `max_chars` characters, appending `...` when cut
///
/// The result is at most `max_chars + 3` characters long.
#[must_use]
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => {
            let mut truncated = String::with_capacity(byte_index + TRUNCATION_SUFFIX.len());
            truncated.push_str(&text[..byte_index]);
            truncated.push_str(TRUNCATION_SUFFIX);
            Cow::Owned(truncated)
        }
        None => Cow::Borrowed(text),
    }
}

/// Leading slice of at most `max_chars` characters, for log output
#[must_use]
pub fn preview(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(byte_index, _)| &text[..byte_index])
}
