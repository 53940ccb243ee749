//! Environment-driven configuration, parsed once at startup.

use std::env;

use anyhow::Context as _;

/// Bridge server configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Listen address, `BIND_ADDR`
    pub bind_addr: String,
    /// Engine sidecar base URL, `ENGINE_URL`
    pub engine_url: String,
    /// Remote ledger server URL, `ACTUAL_SERVER_URL`
    pub server_url: String,
    /// Ledger server credential, `ACTUAL_PASSWORD`
    pub password: Option<String>,
    /// Default budget sync id, `ACTUAL_SYNC_ID`
    pub default_sync_id: Option<String>,
    /// File password for the default budget, `ACTUAL_FILE_PASSWORD`
    pub default_file_password: Option<String>,
    /// Shared secret for `/mcp` routes, `BRIDGE_API_KEY`
    pub api_key: Option<String>,
}

impl WebConfig {
    /// Read configuration from the environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:3000"),
            engine_url: env_or("ENGINE_URL", "http://127.0.0.1:5007"),
            server_url: env::var("ACTUAL_SERVER_URL")
                .context("ACTUAL_SERVER_URL must be set to the ledger server URL")?,
            password: env_opt("ACTUAL_PASSWORD"),
            default_sync_id: env_opt("ACTUAL_SYNC_ID"),
            default_file_password: env_opt("ACTUAL_FILE_PASSWORD"),
            api_key: env_opt("BRIDGE_API_KEY"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

/// Empty values count as unset.
fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}
