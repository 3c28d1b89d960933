// ABOUTME: Integration tests for response headers added by the router layers
// ABOUTME: Checks security headers, cache headers, request ids and CORS across routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{test_config, test_router, test_router_with_config, StubProvider};
use helpers::axum_test::AxumTestRequest;
use leetcode_coach::config::Environment;
use serde_json::{json, Value};

#[tokio::test]
async fn test_security_headers_on_every_route() {
    let app = test_router(StubProvider::text("Hint."));

    let health = AxumTestRequest::get("/health").send(app.clone()).await;
    let hint = AxumTestRequest::post("/get_hint")
        .json(&json!({"problemName": "Two Sum"}))
        .send(app.clone())
        .await;
    let error = AxumTestRequest::post("/get_hint")
        .json(&json!({}))
        .send(app)
        .await;

    for response in [&health, &hint, &error] {
        assert!(response
            .header("content-security-policy")
            .is_some_and(|csp| csp.starts_with("default-src 'none'")));
        assert_eq!(
            response.header("referrer-policy"),
            Some("strict-origin-when-cross-origin")
        );
        assert_eq!(response.header("x-content-type-options"), Some("nosniff"));
        assert_eq!(response.header("x-frame-options"), Some("DENY"));
    }
    assert_eq!(error.status(), 400);
}

#[tokio::test]
async fn test_hsts_only_in_production() {
    let development = AxumTestRequest::get("/health")
        .send(test_router(StubProvider::text("Hint.")))
        .await;
    assert!(development.header("strict-transport-security").is_none());

    let mut config = test_config();
    config.environment = Environment::Production;
    let production = AxumTestRequest::get("/health")
        .send(test_router_with_config(config, StubProvider::text("Hint.")))
        .await;
    assert_eq!(
        production.header("strict-transport-security"),
        Some("max-age=31536000; includeSubDomains")
    );
}

#[tokio::test]
async fn test_cache_headers_on_api_routes_only() {
    let app = test_router(StubProvider::text("Hint."));

    let hint = AxumTestRequest::post("/get_hint")
        .json(&json!({"problemName": "Two Sum"}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(
        hint.header("cache-control"),
        Some("no-store, no-cache, must-revalidate")
    );
    assert_eq!(hint.header("pragma"), Some("no-cache"));

    let health = AxumTestRequest::get("/health").send(app).await;
    assert!(health.header("cache-control").is_none());
}

#[tokio::test]
async fn test_request_id_is_generated_and_propagated() {
    let app = test_router(StubProvider::text("Hint."));

    let generated = AxumTestRequest::get("/health").send(app.clone()).await;
    let id = generated.header("x-request-id").unwrap();
    assert_eq!(id.len(), 36);

    let propagated = AxumTestRequest::get("/health")
        .header("x-request-id", "trace-me-123")
        .send(app)
        .await;
    assert_eq!(propagated.header("x-request-id"), Some("trace-me-123"));
}

#[tokio::test]
async fn test_health_and_ready_payloads() {
    let app = test_router(StubProvider::text("Hint."));

    let health: Value = AxumTestRequest::get("/health")
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(health["status"], "healthy");

    let ready: Value = AxumTestRequest::get("/ready")
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(ready["provider"], "stub");
    assert_eq!(ready["model"], "stub-model");
    assert_eq!(ready["rate_limiting"], true);
}

#[tokio::test]
async fn test_cors_disabled_by_default() {
    let response = AxumTestRequest::get("/health")
        .header("origin", "https://coach.example")
        .send(test_router(StubProvider::text("Hint.")))
        .await;
    assert!(response.header("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let mut config = test_config();
    config.cors.allowed_origins = vec!["https://coach.example".to_owned()];
    let app = test_router_with_config(config, StubProvider::text("Hint."));

    let allowed = AxumTestRequest::get("/health")
        .header("origin", "https://coach.example")
        .send(app.clone())
        .await;
    assert_eq!(
        allowed.header("access-control-allow-origin"),
        Some("https://coach.example")
    );

    let other = AxumTestRequest::get("/health")
        .header("origin", "https://evil.example")
        .send(app)
        .await;
    assert!(other.header("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let response = AxumTestRequest::get("/admin")
        .send(test_router(StubProvider::text("Hint.")))
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_get_on_post_route_is_405() {
    let response = AxumTestRequest::get("/get_hint")
        .send(test_router(StubProvider::text("Hint.")))
        .await;
    assert_eq!(response.status(), 405);
}
