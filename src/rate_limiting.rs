// ABOUTME: Sliding-window rate limiting keyed by client and endpoint
// ABOUTME: Sharded concurrent map with per-key locking and lazy plus periodic stale-key eviction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Sliding Window Rate Limiter
//!
//! Each (client key, endpoint) pair owns an ordered queue of request
//! timestamps. A check evicts timestamps older than the endpoint's window,
//! denies when the remaining count has reached the budget, and otherwise
//! records the request. Denied attempts are never recorded.
//!
//! The evict-check-append sequence for one key runs while holding that key's
//! `DashMap` shard lock, so concurrent requests from the same client cannot
//! both take the last slot.
//!
//! Above `cleanup_threshold` tracked keys, a request may also trigger a full
//! sweep of stale keys. Such sweeps are spaced at least
//! `LAZY_SWEEP_MIN_INTERVAL_SECS` apart, and only one concurrent caller wins
//! each slot.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use coach_core::constants::rate_limits::LAZY_SWEEP_MIN_INTERVAL_SECS;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::{EndpointLimit, RateLimitConfig};
use crate::models::Endpoint;

/// Identity of one rate window
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateLimitKey {
    /// Client identifier, usually an IP address
    pub client: String,
    /// Endpoint the budget applies to
    pub endpoint: Endpoint,
}

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    /// Whether the request may proceed
    pub allowed: bool,
    /// Budget of the window
    pub limit: u32,
    /// Requests left in the current window after this one
    pub remaining: u32,
    /// Window length
    pub window: Duration,
    /// Time until the oldest tracked request leaves the window, when denied
    pub retry_after: Option<Duration>,
}

impl RateLimitStatus {
    /// Status reported when limiting is disabled
    #[must_use]
    pub const fn unlimited(limit: EndpointLimit) -> Self {
        Self {
            allowed: true,
            limit: limit.max_requests,
            remaining: limit.max_requests,
            window: limit.window,
            retry_after: None,
        }
    }
}

/// `last_sweep` value before the first access-triggered sweep
const NEVER_SWEPT: u64 = u64::MAX;

/// Per-client, per-endpoint sliding window rate limiter
#[derive(Clone)]
pub struct SlidingWindowRateLimiter {
    /// (client, endpoint) -> timestamps of recorded requests, oldest first
    state: Arc<DashMap<RateLimitKey, VecDeque<Instant>>>,
    config: RateLimitConfig,
    /// Reference point for `last_sweep`
    epoch: Instant,
    /// Milliseconds after `epoch` of the last access-triggered sweep
    last_sweep: Arc<AtomicU64>,
}

impl SlidingWindowRateLimiter {
    /// Create a limiter from configuration
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            state: Arc::new(DashMap::new()),
            config,
            epoch: Instant::now(),
            last_sweep: Arc::new(AtomicU64::new(NEVER_SWEPT)),
        }
    }

    /// Check and record a request at the current instant
    #[must_use]
    pub fn check(&self, client: &str, endpoint: Endpoint) -> RateLimitStatus {
        self.check_at(client, endpoint, Instant::now())
    }

    /// Whether a request may proceed; records it when allowed
    #[must_use]
    pub fn allow(&self, client: &str, endpoint: Endpoint) -> bool {
        self.check(client, endpoint).allowed
    }

    /// Check and record a request at `now`
    #[must_use]
    pub fn check_at(&self, client: &str, endpoint: Endpoint, now: Instant) -> RateLimitStatus {
        let limit = self.config.limit_for(endpoint);
        if !self.config.enabled {
            return RateLimitStatus::unlimited(limit);
        }

        let key = RateLimitKey {
            client: client.to_owned(),
            endpoint,
        };

        let mut entry = self.state.entry(key).or_default();
        let timestamps = entry.value_mut();

        while timestamps
            .front()
            .is_some_and(|oldest| now.saturating_duration_since(*oldest) >= limit.window)
        {
            timestamps.pop_front();
        }

        let count = u32::try_from(timestamps.len()).unwrap_or(u32::MAX);
        let status = if count >= limit.max_requests {
            let retry_after = timestamps.front().map_or(limit.window, |oldest| {
                limit
                    .window
                    .saturating_sub(now.saturating_duration_since(*oldest))
            });
            RateLimitStatus {
                allowed: false,
                limit: limit.max_requests,
                remaining: 0,
                window: limit.window,
                retry_after: Some(retry_after),
            }
        } else {
            timestamps.push_back(now);
            RateLimitStatus {
                allowed: true,
                limit: limit.max_requests,
                remaining: limit.max_requests - count - 1,
                window: limit.window,
                retry_after: None,
            }
        };
        drop(entry);

        if self.state.len() > self.config.cleanup_threshold && self.claim_sweep(now) {
            self.cleanup_stale(now);
        }

        status
    }

    /// Claim the access-triggered sweep slot for `now`
    ///
    /// Fails while the previous sweep is more recent than
    /// `LAZY_SWEEP_MIN_INTERVAL_SECS`, or when another caller claimed it first.
    fn claim_sweep(&self, now: Instant) -> bool {
        let now_ms = u64::try_from(now.saturating_duration_since(self.epoch).as_millis())
            .unwrap_or(NEVER_SWEPT - 1);
        let last = self.last_sweep.load(Ordering::Acquire);
        if last != NEVER_SWEPT
            && now_ms.saturating_sub(last) < LAZY_SWEEP_MIN_INTERVAL_SECS * 1000
        {
            return false;
        }
        self.last_sweep
            .compare_exchange(last, now_ms, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Remove keys whose newest request has left its window
    ///
    /// Returns the number of evicted keys.
    pub fn cleanup_stale(&self, now: Instant) -> usize {
        let before = self.state.len();
        self.state.retain(|key, timestamps| {
            let window = self.config.limit_for(key.endpoint).window;
            timestamps
                .back()
                .is_some_and(|newest| now.saturating_duration_since(*newest) < window)
        });
        let evicted = before.saturating_sub(self.state.len());
        if evicted > 0 {
            debug!(evicted, remaining = self.state.len(), "Evicted stale rate limit windows");
        }
        evicted
    }

    /// Number of tracked (client, endpoint) windows
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.state.len()
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Spawn a background task that evicts stale windows every `sweep_interval`
    #[must_use]
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let limiter = self.clone();
        let period = self.config.sweep_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                limiter.cleanup_stale(Instant::now());
            }
        })
    }
}
