// ABOUTME: Integration tests for per-client, per-endpoint rate limiting over HTTP
// ABOUTME: Verifies 429 responses, rate limit headers, client key derivation and endpoint independence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use common::{test_config, test_router_with_config, StubProvider};
use helpers::axum_test::AxumTestRequest;
use leetcode_coach::config::{EndpointLimit, RateLimitConfig};
use leetcode_coach::models::Endpoint;
use leetcode_coach::rate_limiting::SlidingWindowRateLimiter;
use serde_json::{json, Value};

fn hint_body() -> Value {
    json!({"problemName": "Two Sum"})
}

fn conversation_body() -> Value {
    json!({"problemName": "Two Sum", "message": "hi"})
}

fn limited_config(max_requests: u32) -> leetcode_coach::config::ServerConfig {
    let mut config = test_config();
    config.rate_limit.hint = EndpointLimit::new(max_requests, 60);
    config.rate_limit.conversation = EndpointLimit::new(max_requests, 60);
    config
}

#[tokio::test]
async fn test_hint_budget_then_429() {
    let provider = StubProvider::text("Hint.");
    let app = test_router_with_config(limited_config(3), provider.clone());

    for remaining in ["2", "1", "0"] {
        let response = AxumTestRequest::post("/get_hint")
            .header("x-forwarded-for", "203.0.113.9")
            .json(&hint_body())
            .send(app.clone())
            .await
            .assert_status(StatusCode::OK);
        assert_eq!(response.header("x-ratelimit-limit"), Some("3"));
        assert_eq!(response.header("x-ratelimit-remaining"), Some(remaining));
        assert_eq!(response.header("x-ratelimit-window"), Some("60"));
    }

    let response = AxumTestRequest::post("/get_hint")
        .header("x-forwarded-for", "203.0.113.9")
        .json(&hint_body())
        .send(app)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    let retry_after: u64 = response.header("retry-after").unwrap().parse().unwrap();
    assert!((1..=60).contains(&retry_after));
    let body: Value = response.json();
    assert_eq!(body["code"], "RATE_LIMITED");

    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn test_rate_limit_precedes_validation() {
    let app = test_router_with_config(limited_config(1), StubProvider::text("Hint."));

    AxumTestRequest::post("/get_hint")
        .header("x-forwarded-for", "198.51.100.4")
        .json(&json!({}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::post("/get_hint")
        .header("x-forwarded-for", "198.51.100.4")
        .header("content-type", "text/plain")
        .raw_body("not json")
        .send(app)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_clients_have_independent_windows() {
    let app = test_router_with_config(limited_config(1), StubProvider::text("Hint."));

    for client in ["203.0.113.1", "203.0.113.2"] {
        AxumTestRequest::post("/get_hint")
            .header("x-forwarded-for", client)
            .json(&hint_body())
            .send(app.clone())
            .await
            .assert_status(StatusCode::OK);
    }

    AxumTestRequest::post("/get_hint")
        .header("x-forwarded-for", "203.0.113.1, 10.0.0.1")
        .json(&hint_body())
        .send(app)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_endpoints_have_independent_windows() {
    let app = test_router_with_config(limited_config(1), StubProvider::text("reply"));

    AxumTestRequest::post("/get_hint")
        .header("x-real-ip", "192.0.2.5")
        .json(&hint_body())
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);

    AxumTestRequest::post("/conversation")
        .header("x-real-ip", "192.0.2.5")
        .json(&conversation_body())
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);

    AxumTestRequest::post("/conversation")
        .header("x-real-ip", "192.0.2.5")
        .json(&conversation_body())
        .send(app)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_unknown_clients_share_a_bucket() {
    let app = test_router_with_config(limited_config(1), StubProvider::text("Hint."));

    AxumTestRequest::post("/get_hint")
        .json(&hint_body())
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);

    AxumTestRequest::post("/get_hint")
        .header("x-forwarded-for", "garbage")
        .json(&hint_body())
        .send(app)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_health_is_not_rate_limited() {
    let app = test_router_with_config(limited_config(1), StubProvider::text("Hint."));
    for _ in 0..5 {
        AxumTestRequest::get("/health")
            .send(app.clone())
            .await
            .assert_status(StatusCode::OK);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_never_exceed_budget() {
    let limiter = Arc::new(SlidingWindowRateLimiter::new(RateLimitConfig {
        hint: EndpointLimit::new(15, 60),
        ..RateLimitConfig::default()
    }));
    let now = Instant::now();

    let handles: Vec<_> = (0..64)
        .map(|_| {
            let limiter = Arc::clone(&limiter);
            tokio::spawn(async move { limiter.check_at("same-client", Endpoint::Hint, now).allowed })
        })
        .collect();

    let mut allowed = 0;
    for handle in handles {
        if handle.await.unwrap() {
            allowed += 1;
        }
    }
    assert_eq!(allowed, 15);
    assert!(!limiter.check_at("same-client", Endpoint::Hint, now + Duration::from_secs(59)).allowed);
    assert!(limiter.check_at("same-client", Endpoint::Hint, now + Duration::from_secs(60)).allowed);
}
