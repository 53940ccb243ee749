//! Actual Bridge HTTP server.
//!
//! Thin actix-web layer over `actual-bridge-core`: resolves the target
//! budget per request, exposes the REST surface, and owns process
//! lifecycle (eager default-budget load, graceful engine shutdown).

mod auth;
mod config;
mod error;
mod handlers;
mod state;

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use actual_bridge_core::engine::HttpLedgerEngine;
use actual_bridge_core::types::{BudgetDefaults, ConnectionConfig};
use actual_bridge_core::ServiceContext;
use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

use crate::config::WebConfig;
use crate::state::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = WebConfig::from_env()?;
    if config.api_key.is_none() {
        tracing::warn!("BRIDGE_API_KEY is not set; /mcp routes are unauthenticated");
    }

    let engine = Arc::new(HttpLedgerEngine::new(&config.engine_url)?);
    let context = ServiceContext::new(
        engine,
        ConnectionConfig {
            server_url: config.server_url.clone(),
            password: config.password.clone(),
        },
        BudgetDefaults {
            sync_id: config.default_sync_id.clone(),
            file_password: config.default_file_password.clone(),
        },
    );

    // Single-budget deployments fail fast if the default budget is broken.
    // Multi-budget deployments load lazily per request.
    if config.default_sync_id.is_some() {
        context
            .sessions
            .resolve(None, None)
            .await
            .context("initial load of the default budget failed")?;
        tracing::info!("Default budget loaded");
    }

    let data = web::Data::new(AppState {
        context,
        api_key: config.api_key.clone(),
    });
    let shutdown_data = data.clone();

    tracing::info!("Listening on {}", config.bind_addr);
    HttpServer::new({
        let data = data.clone();
        move || App::new().app_data(data.clone()).configure(handlers::configure)
    })
    .bind(&config.bind_addr)
    .with_context(|| format!("failed to bind {}", config.bind_addr))?
    .run()
    .await?;

    // In-flight requests have drained at this point.
    if let Err(e) = shutdown_data.context.connections.shutdown().await {
        tracing::warn!("Engine shutdown failed: {e}");
    }
    Ok(())
}
