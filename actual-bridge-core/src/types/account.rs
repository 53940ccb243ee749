//! Account and category types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money;

/// Engine-native account record.
///
/// `balance` is in integer minor units, as the engine reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Account id (engine-assigned, opaque)
    pub id: String,
    /// Display name
    pub name: String,
    /// Account type label (checking, savings, ...)
    #[serde(rename = "type")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Current balance in minor units
    #[serde(default)]
    pub balance: i64,
    /// Whether the account is closed
    #[serde(default)]
    pub closed: bool,
}

/// Engine-native category record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Category id (engine-assigned, opaque)
    pub id: String,
    /// Display name
    pub name: String,
    /// Owning group id, if the engine reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Whether this is an income category
    #[serde(default)]
    pub is_income: bool,
}

/// Name/decimal-balance shaped account for the `/mcp/accounts` surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountView {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Balance in decimal major units
    pub balance: Decimal,
}

impl AccountView {
    /// Shape an engine-native account for the public surface.
    #[must_use]
    pub fn from_account(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            name: account.name.clone(),
            kind: account.kind.clone(),
            balance: money::to_decimal(account.balance),
        }
    }
}

/// Id/name shaped category for the `/mcp/categories` surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
}

impl CategoryView {
    /// Shape an engine-native category for the public surface.
    #[must_use]
    pub fn from_category(category: &Category) -> Self {
        Self {
            id: category.id.clone(),
            name: category.name.clone(),
        }
    }
}
