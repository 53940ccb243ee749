//! Name/id resolution for accounts and categories.
//!
//! Lists are fetched fresh from the engine on every call: the remote ledger
//! is the source of truth and may change between requests, so nothing here
//! is cached across requests.

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::LedgerEngine;
use crate::error::{BridgeError, BridgeResult};
use crate::types::{Account, Category};

/// Id→name lookup tables for response shaping.
#[derive(Debug, Default)]
pub struct NameIndex {
    accounts: HashMap<String, String>,
    categories: HashMap<String, String>,
}

impl NameIndex {
    /// Build the index from engine-native lists.
    #[must_use]
    pub fn new(accounts: &[Account], categories: &[Category]) -> Self {
        Self {
            accounts: accounts
                .iter()
                .map(|a| (a.id.clone(), a.name.clone()))
                .collect(),
            categories: categories
                .iter()
                .map(|c| (c.id.clone(), c.name.clone()))
                .collect(),
        }
    }

    /// Account name for `id`, falling back to the raw id.
    #[must_use]
    pub fn account_name(&self, id: &str) -> String {
        self.accounts.get(id).cloned().unwrap_or_else(|| id.to_string())
    }

    /// Category name for `id`, if known.
    #[must_use]
    pub fn category_name(&self, id: &str) -> Option<String> {
        self.categories.get(id).cloned()
    }
}

/// Resolves human-readable names to engine ids and back.
pub struct EntityResolver {
    engine: Arc<dyn LedgerEngine>,
}

impl EntityResolver {
    /// Create a resolver over `engine`.
    #[must_use]
    pub fn new(engine: Arc<dyn LedgerEngine>) -> Self {
        Self { engine }
    }

    /// Fresh engine account list.
    pub async fn accounts(&self) -> BridgeResult<Vec<Account>> {
        self.engine.get_accounts().await
    }

    /// Fresh engine category list.
    pub async fn categories(&self) -> BridgeResult<Vec<Category>> {
        self.engine.get_categories().await
    }

    /// Find an account by exact, case-sensitive name. Ids are accepted too
    /// (the public API allows either). Duplicate names resolve to the first
    /// match in engine iteration order.
    pub async fn find_account(&self, name_or_id: &str) -> BridgeResult<Account> {
        let accounts = self.accounts().await?;
        Self::match_account(&accounts, name_or_id)
            .ok_or_else(|| BridgeError::AccountNotFound(name_or_id.to_string()))
    }

    /// Find a category by exact, case-sensitive name or by id.
    pub async fn find_category(&self, name_or_id: &str) -> BridgeResult<Category> {
        let categories = self.categories().await?;
        Self::match_category(&categories, name_or_id)
            .ok_or_else(|| BridgeError::CategoryNotFound(name_or_id.to_string()))
    }

    /// Build id→name tables from one pair of fresh lists.
    pub async fn name_index(&self) -> BridgeResult<NameIndex> {
        let accounts = self.accounts().await?;
        let categories = self.categories().await?;
        Ok(NameIndex::new(&accounts, &categories))
    }

    /// First name match in engine order, then id match.
    pub(crate) fn match_account(accounts: &[Account], name_or_id: &str) -> Option<Account> {
        accounts
            .iter()
            .find(|a| a.name == name_or_id)
            .or_else(|| accounts.iter().find(|a| a.id == name_or_id))
            .cloned()
    }

    pub(crate) fn match_category(categories: &[Category], name_or_id: &str) -> Option<Category> {
        categories
            .iter()
            .find(|c| c.name == name_or_id)
            .or_else(|| categories.iter().find(|c| c.id == name_or_id))
            .cloned()
    }
}
