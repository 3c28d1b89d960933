// ABOUTME: Server binary for the LeetCode coaching gateway
// ABOUTME: Loads configuration, initializes logging, wires the Gemini provider and serves HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Coach Server Binary
//!
//! Reads `.env` when present, then the process environment. Command-line
//! flags override the corresponding variables.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use leetcode_coach::config::ServerConfig;
use leetcode_coach::llm::GeminiProvider;
use leetcode_coach::resources::ServerResources;
use leetcode_coach::{logging, server};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "coach-server")]
#[command(about = "LeetCode coaching gateway - hints and conversation backed by Gemini")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override bind address
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e).context("Failed to read .env file");
        }
    }

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }

    let api_key = config
        .llm
        .api_key
        .clone()
        .context("GEMINI_API_KEY must be set")?;
    let provider = GeminiProvider::new(api_key, &config.llm)?;
    info!(model = %config.llm.model, "Gemini provider initialized");

    let resources = Arc::new(ServerResources::new(config, Arc::new(provider))?);

    display_available_endpoints(&resources);

    if let Err(e) = server::run(resources).await {
        error!(error = %e, "Server error");
        return Err(e);
    }
    Ok(())
}

/// Log the public endpoints
fn display_available_endpoints(resources: &ServerResources) {
    let base = format!("http://{}", resources.config.bind_address());
    info!("Available endpoints:");
    info!("  POST {base}/get_hint");
    info!("  POST {base}/conversation");
    info!("  GET  {base}/health");
    info!("  GET  {base}/ready");
}
