// ABOUTME: Rewrites request-body-limit rejections into the JSON error shape
// ABOUTME: Sits outside the tower-http body limit layer so both rejection paths are covered
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use coach_core::errors::AppError;
use http::StatusCode;

/// Replace any `413 Payload Too Large` response with an `{error, code}` body
///
/// The limit layer rejects declared oversized bodies itself, and the body
/// extractor rejects streamed ones; both answer in plain text.
pub async fn payload_too_large_middleware(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if response.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large().into_response()
    } else {
        response
    }
}
