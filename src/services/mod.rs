// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Hosts the coaching pipeline independently of the HTTP transport
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Hint and conversation pipeline
pub mod coaching;

pub use coaching::CoachingService;
