// ABOUTME: Prompt templates for hint and conversation requests loaded at compile time
// ABOUTME: Data-driven catalog keyed by endpoint and type tag with startup placeholder validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Prompt Templates
//!
//! Templates are markdown files compiled into the binary. Each catalog entry
//! pairs a template with the exact set of placeholders it must contain;
//! [`PromptCatalog::load`] refuses to start if a template uses an unknown
//! placeholder or misses a declared one.
//!
//! Rendering is a single left-to-right pass: substituted values are never
//! rescanned, so caller text that looks like a placeholder stays literal.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as _;

use coach_core::constants::markers::{NO_CONTEXT, NO_PREVIOUS_CONVERSATION, NO_PREVIOUS_HINTS};
use coach_core::errors::{AppError, AppResult};

use crate::models::{Endpoint, HintRequestType, MessageType};
use crate::sanitization::SanitizedHistory;

/// Opening hint prompt
pub const HINT_FIRST: &str = include_str!("hint_first.md");

/// Follow-up hint prompt with previous hints
pub const HINT_ANOTHER: &str = include_str!("hint_another.md");

/// Conversation prompt for `messageType = hint`
pub const CONVERSATION_HINT: &str = concat!(
    include_str!("conversation_preamble.md"),
    include_str!("focus_hint.md"),
    include_str!("conversation_turn.md"),
);

/// Conversation prompt for `messageType = analyze`
pub const CONVERSATION_ANALYZE: &str = concat!(
    include_str!("conversation_preamble.md"),
    include_str!("focus_analyze.md"),
    include_str!("conversation_turn.md"),
);

/// Conversation prompt for `messageType = suggest`
pub const CONVERSATION_SUGGEST: &str = concat!(
    include_str!("conversation_preamble.md"),
    include_str!("focus_suggest.md"),
    include_str!("conversation_turn.md"),
);

/// Conversation prompt for `messageType = explain`
pub const CONVERSATION_EXPLAIN: &str = concat!(
    include_str!("conversation_preamble.md"),
    include_str!("focus_explain.md"),
    include_str!("conversation_turn.md"),
);

/// Conversation prompt for `messageType = optimize`
pub const CONVERSATION_OPTIMIZE: &str = concat!(
    include_str!("conversation_preamble.md"),
    include_str!("focus_optimize.md"),
    include_str!("conversation_turn.md"),
);

/// Conversation prompt for `messageType = general`
pub const CONVERSATION_GENERAL: &str = concat!(
    include_str!("conversation_preamble.md"),
    include_str!("focus_general.md"),
    include_str!("conversation_turn.md"),
);

/// Named slot in a template, written `[NAME]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Placeholder {
    /// Sanitized problem name
    ProblemName,
    /// Sanitized hint context
    UserContext,
    /// Numbered earlier coach responses
    PreviousHints,
    /// Rendered conversation transcript
    ConversationContext,
    /// Sanitized latest user message
    UserMessage,
}

impl Placeholder {
    /// Every placeholder
    pub const ALL: [Self; 5] = [
        Self::ProblemName,
        Self::UserContext,
        Self::PreviousHints,
        Self::ConversationContext,
        Self::UserMessage,
    ];

    /// Name between the brackets
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ProblemName => "PROBLEM_NAME",
            Self::UserContext => "USER_CONTEXT",
            Self::PreviousHints => "PREVIOUS_HINTS",
            Self::ConversationContext => "CONVERSATION_CONTEXT",
            Self::UserMessage => "USER_MESSAGE",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

/// Template selector: endpoint plus type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    /// `/get_hint` with a request type
    Hint(HintRequestType),
    /// `/conversation` with a message type
    Conversation(MessageType),
}

impl PromptKind {
    /// Endpoint the template serves
    #[must_use]
    pub const fn endpoint(self) -> Endpoint {
        match self {
            Self::Hint(_) => Endpoint::Hint,
            Self::Conversation(_) => Endpoint::Conversation,
        }
    }

    /// Type tag of the template
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Hint(request_type) => request_type.as_str(),
            Self::Conversation(message_type) => message_type.as_str(),
        }
    }
}

/// Template text with the placeholders it must contain
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    /// Template body
    pub text: &'static str,
    /// Placeholders the body declares
    pub placeholders: &'static [Placeholder],
}

const HINT_FIRST_SLOTS: &[Placeholder] = &[Placeholder::ProblemName, Placeholder::UserContext];
const HINT_ANOTHER_SLOTS: &[Placeholder] = &[
    Placeholder::ProblemName,
    Placeholder::UserContext,
    Placeholder::PreviousHints,
];
const CONVERSATION_SLOTS: &[Placeholder] = &[
    Placeholder::ProblemName,
    Placeholder::ConversationContext,
    Placeholder::UserMessage,
];

/// Built-in catalog entries
fn builtin_entries() -> Vec<(PromptKind, PromptTemplate)> {
    let conversation = |message_type, text| {
        (
            PromptKind::Conversation(message_type),
            PromptTemplate {
                text,
                placeholders: CONVERSATION_SLOTS,
            },
        )
    };

    vec![
        (
            PromptKind::Hint(HintRequestType::FirstHint),
            PromptTemplate {
                text: HINT_FIRST,
                placeholders: HINT_FIRST_SLOTS,
            },
        ),
        (
            PromptKind::Hint(HintRequestType::AnotherHint),
            PromptTemplate {
                text: HINT_ANOTHER,
                placeholders: HINT_ANOTHER_SLOTS,
            },
        ),
        conversation(MessageType::Hint, CONVERSATION_HINT),
        conversation(MessageType::Analyze, CONVERSATION_ANALYZE),
        conversation(MessageType::Suggest, CONVERSATION_SUGGEST),
        conversation(MessageType::Explain, CONVERSATION_EXPLAIN),
        conversation(MessageType::Optimize, CONVERSATION_OPTIMIZE),
        conversation(MessageType::General, CONVERSATION_GENERAL),
    ]
}

/// Sanitized values available to a template
#[derive(Debug, Clone, Copy)]
pub struct PromptInputs<'a> {
    /// Sanitized problem name
    pub problem_name: &'a str,
    /// Sanitized hint context, possibly empty
    pub user_context: &'a str,
    /// Sanitized latest message, possibly empty
    pub user_message: &'a str,
    /// Sanitized history
    pub history: &'a SanitizedHistory,
}

/// Validated mapping from (endpoint, tag) to template
#[derive(Debug, Clone)]
pub struct PromptCatalog {
    templates: HashMap<PromptKind, PromptTemplate>,
}

impl PromptCatalog {
    /// Load and validate the built-in templates
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first template whose
    /// placeholders do not match its declaration, or a missing entry
    pub fn load() -> AppResult<Self> {
        Self::from_entries(builtin_entries())
    }

    /// Build a catalog from explicit entries, validating each one
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a template is inconsistent or an
    /// (endpoint, tag) pair has no template
    pub fn from_entries(entries: Vec<(PromptKind, PromptTemplate)>) -> AppResult<Self> {
        let mut templates = HashMap::with_capacity(entries.len());
        for (kind, template) in entries {
            validate_template(kind, &template)?;
            templates.insert(kind, template);
        }

        let required = HintRequestType::ALL
            .into_iter()
            .map(PromptKind::Hint)
            .chain(MessageType::ALL.into_iter().map(PromptKind::Conversation));
        for kind in required {
            if !templates.contains_key(&kind) {
                return Err(AppError::config(format!(
                    "No prompt template for {} / {}",
                    kind.endpoint(),
                    kind.tag()
                )));
            }
        }

        Ok(Self { templates })
    }

    /// Template registered for `kind`
    #[must_use]
    pub fn template(&self, kind: PromptKind) -> Option<&PromptTemplate> {
        self.templates.get(&kind)
    }

    /// Render the prompt for `kind` from sanitized inputs
    ///
    /// # Errors
    ///
    /// Returns an internal error if no template is registered for `kind`
    pub fn assemble(&self, kind: PromptKind, inputs: &PromptInputs<'_>) -> AppResult<String> {
        let template = self.template(kind).ok_or_else(|| {
            AppError::internal(format!(
                "No prompt template for {} / {}",
                kind.endpoint(),
                kind.tag()
            ))
        })?;

        Ok(render(template.text, |placeholder| match placeholder {
            Placeholder::ProblemName => inputs.problem_name.to_owned(),
            Placeholder::UserContext => {
                if inputs.user_context.is_empty() {
                    NO_CONTEXT.to_owned()
                } else {
                    inputs.user_context.to_owned()
                }
            }
            Placeholder::PreviousHints => render_previous_hints(inputs.history),
            Placeholder::ConversationContext => render_conversation_context(inputs.history),
            Placeholder::UserMessage => inputs.user_message.to_owned(),
        }))
    }
}

/// Numbered coach responses, or a fixed marker when there are none
#[must_use]
pub fn render_previous_hints(history: &SanitizedHistory) -> String {
    if history.is_empty() {
        return NO_PREVIOUS_HINTS.to_owned();
    }

    history
        .iter()
        .enumerate()
        .map(|(i, turn)| format!("Hint {}: {}", i + 1, turn.bot_response))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Ordered transcript of the history, or a fixed marker when empty
#[must_use]
pub fn render_conversation_context(history: &SanitizedHistory) -> String {
    if history.is_empty() {
        return NO_PREVIOUS_CONVERSATION.to_owned();
    }

    let mut context = String::from("Previous conversation:\n");
    for (i, turn) in history.iter().enumerate() {
        let index = i + 1;
        // Writing to a String cannot fail
        let _ = match turn.message_type {
            Some(tag) => writeln!(context, "Exchange {index} ({tag}):"),
            None => writeln!(context, "Exchange {index}:"),
        };
        let _ = writeln!(context, "User: {}", turn.user_input);
        let _ = writeln!(context, "Coach: {}\n", turn.bot_response);
    }
    context
}

/// Split a template into literal text and placeholder tokens
///
/// A token is `[` followed by one or more `A-Z` or `_` characters and `]`.
fn tokens(template: &str) -> Vec<Result<&str, &str>> {
    let mut out = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        let name_len = after
            .find(|c: char| !(c.is_ascii_uppercase() || c == '_'))
            .unwrap_or(after.len());

        if name_len > 0 && after[name_len..].starts_with(']') {
            out.push(Ok(&rest[..open]));
            out.push(Err(&after[..name_len]));
            rest = &after[name_len + 1..];
        } else {
            out.push(Ok(&rest[..=open]));
            rest = after;
        }
    }
    out.push(Ok(rest));
    out
}

/// Single-pass substitution of placeholders
fn render(template: &str, mut value: impl FnMut(Placeholder) -> String) -> String {
    let mut rendered = String::with_capacity(template.len() + 512);
    for token in tokens(template) {
        match token {
            Ok(literal) => rendered.push_str(literal),
            Err(name) => match Placeholder::from_name(name) {
                Some(placeholder) => rendered.push_str(&value(placeholder)),
                None => {
                    rendered.push('[');
                    rendered.push_str(name);
                    rendered.push(']');
                }
            },
        }
    }
    rendered
}

/// Ensure a template uses exactly its declared placeholders
fn validate_template(kind: PromptKind, template: &PromptTemplate) -> AppResult<()> {
    let mut found = BTreeSet::new();
    for name in tokens(template.text).into_iter().filter_map(Result::err) {
        let placeholder = Placeholder::from_name(name).ok_or_else(|| {
            AppError::config(format!(
                "Prompt template {} / {} uses unknown placeholder [{name}]",
                kind.endpoint(),
                kind.tag()
            ))
        })?;
        found.insert(placeholder);
    }

    let declared: BTreeSet<_> = template.placeholders.iter().copied().collect();
    if found != declared {
        let missing: Vec<_> = declared.difference(&found).map(|p| p.name()).collect();
        let undeclared: Vec<_> = found.difference(&declared).map(|p| p.name()).collect();
        return Err(AppError::config(format!(
            "Prompt template {} / {} placeholder mismatch (missing: {missing:?}, undeclared: {undeclared:?})",
            kind.endpoint(),
            kind.tag()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitization::{sanitize_history, Sanitizer};
    use coach_core::errors::ErrorCode;
    use serde_json::json;

    fn history(raw: &serde_json::Value) -> SanitizedHistory {
        sanitize_history(&Sanitizer::standard().unwrap(), Some(raw))
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = PromptCatalog::load().unwrap();
        for message_type in MessageType::ALL {
            assert!(catalog.template(PromptKind::Conversation(message_type)).is_some());
        }
    }

    #[test]
    fn test_first_hint_substitution() {
        let catalog = PromptCatalog::load().unwrap();
        let empty = SanitizedHistory::default();
        let prompt = catalog
            .assemble(
                PromptKind::Hint(HintRequestType::FirstHint),
                &PromptInputs {
                    problem_name: "Two Sum",
                    user_context: "",
                    user_message: "",
                    history: &empty,
                },
            )
            .unwrap();

        assert!(prompt.contains("PROBLEM TO ANALYZE: Two Sum\n"));
        assert!(prompt.contains("USER CONTEXT: No additional context provided"));
        assert!(!prompt.contains("[PROBLEM_NAME]"));
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let catalog = PromptCatalog::load().unwrap();
        let empty = SanitizedHistory::default();
        let prompt = catalog
            .assemble(
                PromptKind::Conversation(MessageType::General),
                &PromptInputs {
                    problem_name: "Two Sum",
                    user_context: "",
                    user_message: "echo [PROBLEM_NAME] and [USER_MESSAGE]",
                    history: &empty,
                },
            )
            .unwrap();

        assert!(prompt.contains("Student's Latest Message: echo [PROBLEM_NAME] and [USER_MESSAGE]"));
        assert!(prompt.contains("No previous conversation."));
    }

    #[test]
    fn test_conversation_context_rendering() {
        let history = history(&json!([
            {"userInput": "I tried brute force", "botResponse": "What is its complexity?", "messageType": "analyze"},
            {"userInput": "O(n^2)", "botResponse": "Can you do better?"},
        ]));
        let context = render_conversation_context(&history);
        assert_eq!(
            context,
            "Previous conversation:\n\
             Exchange 1 (analyze):\nUser: I tried brute force\nCoach: What is its complexity?\n\n\
             Exchange 2:\nUser: O(n^2)\nCoach: Can you do better?\n\n"
        );
    }

    #[test]
    fn test_previous_hints_rendering() {
        assert_eq!(render_previous_hints(&SanitizedHistory::default()), "No previous hints");
        let history = history(&json!([
            {"userInput": "hint please", "botResponse": "Think about sorting."},
            {"userInput": "another", "botResponse": "Think about two pointers."},
        ]));
        assert_eq!(
            render_previous_hints(&history),
            "Hint 1: Think about sorting.\nHint 2: Think about two pointers."
        );
    }

    #[test]
    fn test_undeclared_placeholder_fails_fast() {
        let mut entries = builtin_entries();
        entries[0].1 = PromptTemplate {
            text: "Problem: [PROBLEM_NAME] Hints: [PREVIOUS_HINTS] [USER_CONTEXT]",
            placeholders: HINT_FIRST_SLOTS,
        };
        let error = PromptCatalog::from_entries(entries).unwrap_err();
        assert_eq!(error.code, ErrorCode::ConfigError);
        assert!(error.message.contains("PREVIOUS_HINTS"));
    }

    #[test]
    fn test_unknown_placeholder_fails_fast() {
        let mut entries = builtin_entries();
        entries[0].1 = PromptTemplate {
            text: "[PROBLEM_NAME] [USER_CONTEXT] [SECRET]",
            placeholders: HINT_FIRST_SLOTS,
        };
        assert!(PromptCatalog::from_entries(entries).is_err());
    }

    #[test]
    fn test_missing_entry_fails_fast() {
        let mut entries = builtin_entries();
        entries.pop();
        let error = PromptCatalog::from_entries(entries).unwrap_err();
        assert!(error.message.contains("general"));
    }

    #[test]
    fn test_tokenizer_ignores_non_placeholders() {
        let parts = tokens("a [b] [C_D] [ [E");
        assert_eq!(
            parts,
            vec![Ok("a ["), Ok("b] "), Err("C_D"), Ok(" ["), Ok(" ["), Ok("E")]
        );
    }
}
