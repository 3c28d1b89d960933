// ABOUTME: HTTP route handlers for the hint and conversation endpoints
// ABOUTME: Checks content type and JSON shape, then delegates to the coaching service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Coaching routes
//!
//! Handlers are thin: they reject non-JSON bodies and hand the parsed object
//! to [`CoachingService`]. Rate limiting runs as a per-route layer before the
//! handler, so a throttled client never reaches body parsing.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use axum::http::{HeaderMap, HeaderValue};
use axum::routing::post;
use axum::{middleware, Json, Router};
use coach_core::constants::{messages, routes};
use coach_core::errors::{AppError, AppResult};
use serde_json::{Map, Value};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::middleware::{rate_limit_middleware, RateLimitLayer};
use crate::models::{ConversationResponse, Endpoint, HintResponse};
use crate::resources::ServerResources;
use crate::services::CoachingService;

/// Whether the request declares a JSON body
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

/// Content type and body shape check
fn json_object(headers: &HeaderMap, body: &Bytes) -> AppResult<Map<String, Value>> {
    if !is_json(headers) {
        return Err(AppError::malformed(messages::UNSUPPORTED_CONTENT_TYPE));
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::malformed(messages::INVALID_JSON)),
        Err(e) => Err(AppError::malformed(messages::INVALID_JSON).with_source(e)),
    }
}

/// Coaching routes implementation
pub struct CoachRoutes;

impl CoachRoutes {
    /// Create the `/get_hint` and `/conversation` routes with their rate limits
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        let limiter = resources.rate_limiter.clone();

        let hint = Router::new()
            .route(routes::GET_HINT, post(Self::get_hint))
            .layer(middleware::from_fn_with_state(
                RateLimitLayer::new(limiter.clone(), Endpoint::Hint),
                rate_limit_middleware,
            ));

        let conversation = Router::new()
            .route(routes::CONVERSATION, post(Self::conversation))
            .layer(middleware::from_fn_with_state(
                RateLimitLayer::new(limiter, Endpoint::Conversation),
                rate_limit_middleware,
            ));

        hint.merge(conversation)
            .layer(SetResponseHeaderLayer::overriding(
                CACHE_CONTROL,
                HeaderValue::from_static("no-store, no-cache, must-revalidate"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                PRAGMA,
                HeaderValue::from_static("no-cache"),
            ))
            .with_state(resources)
    }

    /// `POST /get_hint`
    async fn get_hint(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> AppResult<Json<HintResponse>> {
        let body = json_object(&headers, &body)?;
        let response = CoachingService::new(resources).get_hint(&body).await?;
        Ok(Json(response))
    }

    /// `POST /conversation`
    async fn conversation(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> AppResult<Json<ConversationResponse>> {
        let body = json_object(&headers, &body)?;
        let response = CoachingService::new(resources).converse(&body).await?;
        Ok(Json(response))
    }
}
