//! MCP Server entry point for the Actual Budget bridge.
//!
//! Starts the MCP server with stdio transport. Every tool call is forwarded
//! to the actual-bridge HTTP API; this process holds no budget state itself.

mod client;
mod schemas;
mod server;

use std::process::ExitCode;

use client::{BridgeClient, BridgeConfig};
use rmcp::ServiceExt;
use server::ActualBridgeMcp;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing to stderr (MCP uses stdout for protocol)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_ansi(false),
        )
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    tracing::info!("Starting Actual Budget MCP Server");

    let config = BridgeConfig::from_env();
    tracing::info!("Bridge endpoint: {}", config.base_url);
    if config.api_key.is_none() {
        tracing::warn!("BRIDGE_API_KEY is not set; requests to the bridge are unauthenticated");
    }

    let bridge_client = match BridgeClient::new(config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to build bridge client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mcp_server = ActualBridgeMcp::new(bridge_client);
    tracing::info!("MCP server initialized with 7 tools");

    // Start serving via stdio
    tracing::info!("Starting MCP server on stdio transport");
    let service = match mcp_server.serve(rmcp::transport::stdio()).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start MCP server: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Wait for the server to complete
    if let Err(e) = service.waiting().await {
        tracing::error!("MCP server error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
