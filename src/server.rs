// ABOUTME: HTTP server assembly and lifecycle for the coach gateway
// ABOUTME: Builds the axum router with its tower layers and serves it until a shutdown signal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Server Lifecycle
//!
//! Layer order, outermost first: CORS (when configured), request id
//! assignment and propagation, HTTP tracing, security headers, JSON bodies
//! for oversized requests, body size limit, then the routes with their own rate limiting and cache headers.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::{payload_too_large_middleware, setup_cors};
use crate::resources::ServerResources;
use crate::routes::{CoachRoutes, HealthRoutes};
use crate::security::security_headers_middleware;

/// Build the application router
pub fn build_router(resources: &Arc<ServerResources>) -> Router {
    let security_headers = Arc::new(resources.security.to_headers());

    let router = Router::new()
        .merge(CoachRoutes::routes(Arc::clone(resources)))
        .merge(HealthRoutes::routes(Arc::clone(resources)))
        .layer(RequestBodyLimitLayer::new(
            resources.config.max_request_body_bytes,
        ))
        .layer(middleware::from_fn(payload_too_large_middleware))
        .layer(middleware::from_fn_with_state(
            security_headers,
            security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    match setup_cors(&resources.config.cors) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// Bind the configured address and serve until Ctrl-C or SIGTERM
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
pub async fn run(resources: Arc<ServerResources>) -> Result<()> {
    let address = resources.config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    let sweeper = resources
        .config
        .rate_limit
        .enabled
        .then(|| resources.rate_limiter.spawn_sweeper());

    info!(
        address = %address,
        provider = resources.llm.display_name(),
        model = resources.llm.default_model(),
        "HTTP server listening"
    );

    let app = build_router(&resources);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("HTTP server terminated with an error")?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    info!("HTTP server stopped");
    Ok(())
}

/// Resolve on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
