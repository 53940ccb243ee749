//! HTTP client implementation of [`LedgerEngine`].
//!
//! Talks to the engine sidecar's JSON API, one endpoint per trait method.
//! The sidecar holds the actual ledger library and its on-disk budget
//! cache; this client carries no state besides the base URL.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::error::{BridgeError, BridgeResult};
use crate::types::{
    Account, BudgetMonth, Category, ConnectionConfig, NewTransaction, TransactionPatch,
    TransactionRecord,
};

use super::LedgerEngine;

/// Per-call deadline. Budget downloads take seconds; everything else is
/// a local read on the sidecar.
const ENGINE_TIMEOUT_SECS: u64 = 120;

/// Reqwest-backed engine client.
pub struct HttpLedgerEngine {
    base_url: String,
    client: reqwest::Client,
}

impl HttpLedgerEngine {
    /// Create a client for the engine sidecar at `base_url`.
    pub fn new(base_url: &str) -> BridgeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(ENGINE_TIMEOUT_SECS))
            .build()
            .map_err(|e| BridgeError::ConnectionError(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Classify transport failures: timeouts become `GatewayTimeout`,
    /// connection failures `ConnectionError`, everything else `UpstreamError`.
    fn transport_error(e: &reqwest::Error) -> BridgeError {
        if e.is_timeout() {
            BridgeError::GatewayTimeout(e.to_string())
        } else if e.is_connect() {
            BridgeError::ConnectionError(e.to_string())
        } else {
            BridgeError::UpstreamError(e.to_string())
        }
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> BridgeResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::UpstreamError(format!(
                "engine returned {status}: {body}"
            )));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| BridgeError::SerializationError(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> BridgeResult<T> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;
        Self::decode(response).await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> BridgeResult<T> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;
        Self::decode(response).await
    }
}

/// Envelope for engine responses that carry a single generated id.
#[derive(serde::Deserialize)]
struct IdResponse {
    id: String,
}

/// Empty acknowledgement body.
#[derive(serde::Deserialize)]
struct Ack {}

#[async_trait]
impl LedgerEngine for HttpLedgerEngine {
    async fn init(&self, config: &ConnectionConfig) -> BridgeResult<()> {
        let _: Ack = self.post_json("/init", config).await?;
        Ok(())
    }

    async fn download_budget(&self, sync_id: &str, password: Option<&str>) -> BridgeResult<()> {
        let body = json!({ "syncId": sync_id, "password": password });
        // Download failures are budget-scoped, not connection-scoped.
        let result: BridgeResult<Ack> = self.post_json("/download-budget", &body).await;
        match result {
            Ok(_) => Ok(()),
            Err(BridgeError::UpstreamError(message)) => Err(BridgeError::BudgetLoadError {
                sync_id: sync_id.to_string(),
                message,
            }),
            Err(e) => Err(e),
        }
    }

    async fn get_accounts(&self) -> BridgeResult<Vec<Account>> {
        self.get_json("/accounts").await
    }

    async fn get_categories(&self) -> BridgeResult<Vec<Category>> {
        self.get_json("/categories").await
    }

    async fn get_transactions(&self) -> BridgeResult<Vec<TransactionRecord>> {
        self.get_json("/transactions").await
    }

    async fn add_transaction(
        &self,
        account_id: &str,
        tx: &NewTransaction,
    ) -> BridgeResult<String> {
        let body = json!({ "accountId": account_id, "transaction": tx });
        let response: IdResponse = self.post_json("/transactions", &body).await?;
        Ok(response.id)
    }

    async fn update_transaction(&self, id: &str, patch: &TransactionPatch) -> BridgeResult<()> {
        let _: Ack = self
            .post_json(&format!("/transactions/{id}/update"), patch)
            .await?;
        Ok(())
    }

    async fn delete_transaction(&self, id: &str) -> BridgeResult<()> {
        let _: Ack = self
            .post_json(&format!("/transactions/{id}/delete"), &json!({}))
            .await?;
        Ok(())
    }

    async fn get_budget_month(&self, month: &str) -> BridgeResult<BudgetMonth> {
        self.get_json(&format!("/budget-month/{month}")).await
    }

    async fn shutdown(&self) -> BridgeResult<()> {
        let _: Ack = self.post_json("/shutdown", &json!({})).await?;
        Ok(())
    }
}
