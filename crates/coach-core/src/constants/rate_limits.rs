// ABOUTME: Rate limiting constants for the sliding-window limiter
// ABOUTME: Per-endpoint request budgets, window lengths and cleanup intervals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Conversation endpoint: requests allowed per window
pub const CONVERSATION_MAX_REQUESTS: u32 = 20;

/// Conversation endpoint: window length in seconds
pub const CONVERSATION_WINDOW_SECS: u64 = 60;

/// Hint endpoint: requests allowed per window
pub const HINT_MAX_REQUESTS: u32 = 15;

/// Hint endpoint: window length in seconds
pub const HINT_WINDOW_SECS: u64 = 60;

/// Tracked keys above which stale entries are evicted on access
pub const DEFAULT_CLEANUP_THRESHOLD: usize = 10_000;

/// Minimum spacing between access-triggered sweeps in seconds
pub const LAZY_SWEEP_MIN_INTERVAL_SECS: u64 = 10;

/// Interval of the background stale-key sweep in seconds
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300; // 5 minutes

/// Shared bucket for clients whose address cannot be resolved
pub const UNKNOWN_CLIENT_KEY: &str = "unknown";
