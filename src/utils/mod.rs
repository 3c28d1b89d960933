// ABOUTME: Utility module with shared helper functions
// ABOUTME: Currently hosts character-aware text truncation helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Character-aware truncation and previews
pub mod text;
