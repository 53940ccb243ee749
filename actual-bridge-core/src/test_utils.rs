//! Test helpers: a scriptable mock engine and fixture factories.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::engine::LedgerEngine;
use crate::error::{BridgeError, BridgeResult};
use crate::types::{
    Account, BudgetMonth, Category, ConnectionConfig, NewTransaction, TransactionPatch,
    TransactionRecord,
};

/// Mock engine with call counters and injectable failures/delays.
///
/// Setters are synchronous; locks are never held across an await point.
pub struct MockLedgerEngine {
    init_count: Mutex<usize>,
    init_error: Mutex<Option<String>>,
    /// Download attempts per sync id, failures included.
    download_counts: Mutex<HashMap<String, usize>>,
    download_passwords: Mutex<HashMap<String, Option<String>>>,
    download_delay: Mutex<Option<Duration>>,
    download_error: Mutex<Option<String>>,
    shutdown_count: Mutex<usize>,
    accounts: Mutex<Vec<Account>>,
    categories: Mutex<Vec<Category>>,
    transactions: Mutex<Vec<TransactionRecord>>,
    budget_months: Mutex<HashMap<String, (i64, i64)>>,
    add_delay: Mutex<Option<Duration>>,
    add_error: Mutex<Option<String>>,
    adds: Mutex<Vec<(String, NewTransaction)>>,
    updates: Mutex<Vec<(String, TransactionPatch)>>,
    deletes: Mutex<Vec<String>>,
}

impl MockLedgerEngine {
    pub fn new() -> Self {
        Self {
            init_count: Mutex::new(0),
            init_error: Mutex::new(None),
            download_counts: Mutex::new(HashMap::new()),
            download_passwords: Mutex::new(HashMap::new()),
            download_delay: Mutex::new(None),
            download_error: Mutex::new(None),
            shutdown_count: Mutex::new(0),
            accounts: Mutex::new(Vec::new()),
            categories: Mutex::new(Vec::new()),
            transactions: Mutex::new(Vec::new()),
            budget_months: Mutex::new(HashMap::new()),
            add_delay: Mutex::new(None),
            add_error: Mutex::new(None),
            adds: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
        }
    }

    pub fn set_init_error(&self, err: Option<String>) {
        *self.init_error.lock().unwrap() = err;
    }

    pub fn set_download_error(&self, err: Option<String>) {
        *self.download_error.lock().unwrap() = err;
    }

    pub fn set_download_delay(&self, delay: Option<Duration>) {
        *self.download_delay.lock().unwrap() = delay;
    }

    pub fn set_add_delay(&self, delay: Option<Duration>) {
        *self.add_delay.lock().unwrap() = delay;
    }

    pub fn set_add_error(&self, err: Option<String>) {
        *self.add_error.lock().unwrap() = err;
    }

    pub fn set_accounts(&self, accounts: Vec<Account>) {
        *self.accounts.lock().unwrap() = accounts;
    }

    pub fn set_categories(&self, categories: Vec<Category>) {
        *self.categories.lock().unwrap() = categories;
    }

    pub fn set_transactions(&self, transactions: Vec<TransactionRecord>) {
        *self.transactions.lock().unwrap() = transactions;
    }

    pub fn set_budget_month(&self, month: &str, total_income: i64, total_spent: i64) {
        self.budget_months
            .lock()
            .unwrap()
            .insert(month.to_string(), (total_income, total_spent));
    }

    pub fn init_count(&self) -> usize {
        *self.init_count.lock().unwrap()
    }

    pub fn download_count(&self, sync_id: &str) -> usize {
        self.download_counts
            .lock()
            .unwrap()
            .get(sync_id)
            .copied()
            .unwrap_or(0)
    }

    /// Password passed to the most recent download for `sync_id`.
    /// `None` means no download happened at all.
    pub fn last_download_password(&self, sync_id: &str) -> Option<Option<String>> {
        self.download_passwords.lock().unwrap().get(sync_id).cloned()
    }

    pub fn shutdown_count(&self) -> usize {
        *self.shutdown_count.lock().unwrap()
    }

    pub fn add_count(&self) -> usize {
        self.adds.lock().unwrap().len()
    }

    pub fn last_added(&self) -> Option<(String, NewTransaction)> {
        self.adds.lock().unwrap().last().cloned()
    }

    pub fn last_updated(&self) -> Option<(String, TransactionPatch)> {
        self.updates.lock().unwrap().last().cloned()
    }

    pub fn deleted_ids(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerEngine for MockLedgerEngine {
    async fn init(&self, _config: &ConnectionConfig) -> BridgeResult<()> {
        *self.init_count.lock().unwrap() += 1;
        if let Some(msg) = self.init_error.lock().unwrap().clone() {
            return Err(BridgeError::ConnectionError(msg));
        }
        Ok(())
    }

    async fn download_budget(&self, sync_id: &str, password: Option<&str>) -> BridgeResult<()> {
        {
            let mut counts = self.download_counts.lock().unwrap();
            *counts.entry(sync_id.to_string()).or_insert(0) += 1;
        }
        self.download_passwords
            .lock()
            .unwrap()
            .insert(sync_id.to_string(), password.map(str::to_string));

        let delay = *self.download_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(msg) = self.download_error.lock().unwrap().clone() {
            return Err(BridgeError::BudgetLoadError {
                sync_id: sync_id.to_string(),
                message: msg,
            });
        }
        Ok(())
    }

    async fn get_accounts(&self) -> BridgeResult<Vec<Account>> {
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn get_categories(&self) -> BridgeResult<Vec<Category>> {
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn get_transactions(&self) -> BridgeResult<Vec<TransactionRecord>> {
        Ok(self.transactions.lock().unwrap().clone())
    }

    async fn add_transaction(
        &self,
        account_id: &str,
        transaction: &NewTransaction,
    ) -> BridgeResult<String> {
        let delay = *self.add_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(msg) = self.add_error.lock().unwrap().clone() {
            return Err(BridgeError::UpstreamError(msg));
        }

        let mut adds = self.adds.lock().unwrap();
        adds.push((account_id.to_string(), transaction.clone()));
        Ok(format!("mock-tx-{}", adds.len()))
    }

    async fn update_transaction(&self, id: &str, patch: &TransactionPatch) -> BridgeResult<()> {
        self.updates
            .lock()
            .unwrap()
            .push((id.to_string(), patch.clone()));
        Ok(())
    }

    async fn delete_transaction(&self, id: &str) -> BridgeResult<()> {
        self.deletes.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn get_budget_month(&self, month: &str) -> BridgeResult<BudgetMonth> {
        let (total_income, total_spent) = self
            .budget_months
            .lock()
            .unwrap()
            .get(month)
            .copied()
            .unwrap_or((0, 0));
        Ok(BudgetMonth {
            month: month.to_string(),
            total_income,
            total_spent,
        })
    }

    async fn shutdown(&self) -> BridgeResult<()> {
        *self.shutdown_count.lock().unwrap() += 1;
        Ok(())
    }
}

// ===== fixture factories =====

pub fn test_config() -> ConnectionConfig {
    ConnectionConfig {
        server_url: "http://localhost:5006".to_string(),
        password: Some("test-password".to_string()),
    }
}

pub fn account(id: &str, name: &str) -> Account {
    Account {
        id: id.to_string(),
        name: name.to_string(),
        kind: Some("checking".to_string()),
        balance: 0,
        closed: false,
    }
}

pub fn category(id: &str, name: &str) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        group_id: Some("group-1".to_string()),
        is_income: false,
    }
}

pub fn transaction(
    id: &str,
    account: &str,
    amount: i64,
    date: &str,
    category: Option<&str>,
    payee: Option<&str>,
) -> TransactionRecord {
    TransactionRecord {
        id: id.to_string(),
        date: date.parse::<NaiveDate>().expect("fixture date"),
        amount,
        account: account.to_string(),
        category: category.map(str::to_string),
        payee_name: payee.map(str::to_string),
        notes: None,
        imported_payee: None,
        imported_id: None,
        cleared: false,
    }
}
