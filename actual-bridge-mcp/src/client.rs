//! HTTP client for the actual-bridge API.
//!
//! Each method maps to one bridge endpoint and passes the bridge's JSON
//! response through untouched; shaping happens bridge-side.

use std::env;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Request deadline against the bridge.
const BRIDGE_TIMEOUT_SECS: u64 = 30;

/// Failure talking to the bridge.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The bridge was unreachable or the response unusable.
    #[error("bridge request failed: {0}")]
    Transport(String),

    /// The bridge answered with a non-success status.
    #[error("bridge returned {status}: {message}")]
    Rejected { status: u16, message: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Connection settings, read from the environment.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub sync_id: Option<String>,
    pub file_password: Option<String>,
}

impl BridgeConfig {
    /// `ACTUAL_BRIDGE_URL` plus the optional auth/budget headers.
    pub fn from_env() -> Self {
        Self {
            base_url: env_opt("ACTUAL_BRIDGE_URL")
                .unwrap_or_else(|| "http://actual-bridge:3000".to_string()),
            api_key: env_opt("BRIDGE_API_KEY"),
            sync_id: env_opt("ACTUAL_SYNC_ID"),
            file_password: env_opt("ACTUAL_FILE_PASSWORD"),
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

/// Reqwest client over the bridge REST surface.
pub struct BridgeClient {
    config: BridgeConfig,
    client: reqwest::Client,
}

impl BridgeClient {
    pub fn new(config: BridgeConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(BRIDGE_TIMEOUT_SECS))
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Attach the configured auth and budget-selection headers.
    fn headers(&self, mut builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(key) = self.config.api_key.as_deref() {
            builder = builder.header("x-api-key", key);
        }
        if let Some(sync_id) = self.config.sync_id.as_deref() {
            builder = builder.header("x-actual-sync-id", sync_id);
        }
        if let Some(password) = self.config.file_password.as_deref() {
            builder = builder.header("x-actual-file-password", password);
        }
        builder
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> ClientResult<Value> {
        let response = self
            .headers(builder)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("no error detail")
                .to_string();
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))
    }

    pub async fn get_accounts(&self) -> ClientResult<Value> {
        self.send(self.client.get(self.url("/mcp/accounts"))).await
    }

    pub async fn get_categories(&self) -> ClientResult<Value> {
        self.send(self.client.get(self.url("/mcp/categories"))).await
    }

    pub async fn get_monthly_summary(&self, month: &str) -> ClientResult<Value> {
        self.send(
            self.client
                .get(self.url("/mcp/summary/month"))
                .query(&[("month", month)]),
        )
        .await
    }

    pub async fn add_transaction(&self, payload: &Value) -> ClientResult<Value> {
        self.send(
            self.client
                .post(self.url("/mcp/transactions/add"))
                .json(payload),
        )
        .await
    }

    pub async fn edit_transaction(&self, id: &str, payload: &Value) -> ClientResult<Value> {
        self.send(
            self.client
                .put(self.url(&format!("/mcp/transactions/{id}")))
                .json(payload),
        )
        .await
    }

    pub async fn delete_transaction(&self, id: &str) -> ClientResult<Value> {
        self.send(
            self.client
                .delete(self.url(&format!("/mcp/transactions/{id}"))),
        )
        .await
    }

    pub async fn query_transactions(&self, payload: &Value) -> ClientResult<Value> {
        self.send(
            self.client
                .post(self.url("/mcp/transactions/query"))
                .json(payload),
        )
        .await
    }
}
