//! Ledger engine abstraction.
//!
//! The engine is an external collaborator: it owns account/category/
//! transaction storage and budget math. The bridge only drives its
//! lifecycle and converts payload shapes. Every trait method is one awaited
//! operation with a single success/failure outcome; callers must not assume
//! atomicity across two calls.

mod http_client;

pub use http_client::HttpLedgerEngine;

use async_trait::async_trait;

use crate::error::BridgeResult;
use crate::types::{
    Account, BudgetMonth, Category, ConnectionConfig, NewTransaction, TransactionPatch,
    TransactionRecord,
};

/// Opaque ledger engine interface.
#[async_trait]
pub trait LedgerEngine: Send + Sync {
    /// Open the engine connection. Called once per process.
    async fn init(&self, config: &ConnectionConfig) -> BridgeResult<()>;

    /// Download (and decrypt) a remote budget into the local cache.
    async fn download_budget(&self, sync_id: &str, password: Option<&str>) -> BridgeResult<()>;

    /// List accounts of the currently loaded budget.
    async fn get_accounts(&self) -> BridgeResult<Vec<Account>>;

    /// List categories of the currently loaded budget.
    async fn get_categories(&self) -> BridgeResult<Vec<Category>>;

    /// Full transaction list of the currently loaded budget.
    async fn get_transactions(&self) -> BridgeResult<Vec<TransactionRecord>>;

    /// Create a transaction; returns the engine-assigned id.
    async fn add_transaction(
        &self,
        account_id: &str,
        tx: &NewTransaction,
    ) -> BridgeResult<String>;

    /// Apply a partial update to a transaction.
    async fn update_transaction(&self, id: &str, patch: &TransactionPatch) -> BridgeResult<()>;

    /// Delete a transaction. May be silently idempotent on unknown ids.
    async fn delete_transaction(&self, id: &str) -> BridgeResult<()>;

    /// Monthly totals for `YYYY-MM`.
    async fn get_budget_month(&self, month: &str) -> BridgeResult<BudgetMonth>;

    /// Release the engine connection on graceful termination.
    async fn shutdown(&self) -> BridgeResult<()>;
}
