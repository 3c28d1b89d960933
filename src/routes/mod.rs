// ABOUTME: Route module organization for the coach server HTTP endpoints
// ABOUTME: Groups coaching and health routes, each exposing a Router built from shared resources
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Route definitions with thin handlers that delegate to the service layer.

/// Hint and conversation routes
pub mod coach;
/// Health check and readiness routes
pub mod health;

pub use coach::CoachRoutes;
pub use health::HealthRoutes;
