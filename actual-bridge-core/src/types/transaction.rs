//! Transaction payloads: engine-native records, public drafts and views.
//!
//! Two representations exist on purpose. Engine-native types carry ids and
//! integer minor units; public types carry names and decimal amounts. The
//! mutation pipeline converts between them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Engine-native transaction record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction id (engine-assigned)
    pub id: String,
    /// Posting date
    pub date: NaiveDate,
    /// Amount in minor units (negative for expenses)
    pub amount: i64,
    /// Owning account id
    pub account: String,
    /// Category id, if categorized
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Payee display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payee_name: Option<String>,
    /// Free-text notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Payee string as imported from a bank feed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported_payee: Option<String>,
    /// Import-dedup token (the engine skips records it has seen)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported_id: Option<String>,
    /// Whether the transaction has cleared
    #[serde(default)]
    pub cleared: bool,
}

/// Normalized create payload sent to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub date: NaiveDate,
    /// Amount in minor units
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payee_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Idempotency key passed through as the engine's import-dedup field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported_id: Option<String>,
}

/// Partial update sent to the engine. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Amount in minor units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    /// Category id (already resolved)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Account id (already resolved; moves the transaction)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payee_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleared: Option<bool>,
}

impl TransactionPatch {
    /// True when no field is set (nothing to update).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.account.is_none()
            && self.payee_name.is_none()
            && self.notes.is_none()
            && self.cleared.is_none()
    }
}

/// Public mutation payload. Accounts and categories are referenced by name
/// (ids are also accepted); the amount is decimal major units.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionDraft {
    /// Account name or id
    pub account: String,
    /// Decimal amount, negative for expenses
    pub amount: Decimal,
    /// Posting date, `YYYY-MM-DD`
    pub date: NaiveDate,
    /// Category name or id
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub payee: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Client-supplied idempotency key
    #[serde(default, rename = "requestId")]
    pub request_id: Option<String>,
    /// Validate and resolve without writing
    #[serde(default, rename = "dryRun")]
    pub dry_run: bool,
}

/// Public partial-edit payload. Only supplied fields change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditRequest {
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Category name or id
    #[serde(default)]
    pub category: Option<String>,
    /// Account name or id (moves the transaction)
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub payee: Option<String>,
    #[serde(default)]
    pub cleared: Option<bool>,
}

impl EditRequest {
    /// True when the payload changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.date.is_none()
            && self.category.is_none()
            && self.account.is_none()
            && self.notes.is_none()
            && self.payee.is_none()
            && self.cleared.is_none()
    }
}

/// A single account name or a list of names (both accepted on the wire).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NameOrList {
    One(String),
    Many(Vec<String>),
}

impl NameOrList {
    /// Flatten into a list of names.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(name) => vec![name],
            Self::Many(names) => names,
        }
    }
}

/// Public query filters. All fields optional; bounds are inclusive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryFilter {
    /// Account name(s); single string or list
    #[serde(default)]
    pub accounts: Option<NameOrList>,
    /// Category name
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Decimal major units
    #[serde(default)]
    pub min_amount: Option<Decimal>,
    #[serde(default)]
    pub max_amount: Option<Decimal>,
    /// Substring search across notes, payee and imported payee
    #[serde(default)]
    pub search: Option<String>,
    /// Max results (default 100)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Name/decimal shaped transaction for the public surface.
///
/// `id` is absent on dry runs; every other field matches the non-dry-run
/// response exactly (parity requirement).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub account: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Mutation response envelope: `{ ok, transaction, message }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub ok: bool,
    pub transaction: TransactionView,
    pub message: String,
}

/// Pre-delete snapshot returned for audit/confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedSnapshot {
    pub id: String,
    /// Account name at deletion time
    pub account: String,
    pub amount: Decimal,
    pub date: NaiveDate,
}

/// Delete response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteReceipt {
    pub ok: bool,
    pub deleted: DeletedSnapshot,
    pub message: String,
}

/// Engine-native monthly totals, minor units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetMonth {
    pub month: String,
    /// Income received, minor units (non-negative)
    pub total_income: i64,
    /// Spending, minor units (the engine reports expenses as negative)
    pub total_spent: i64,
}

/// Public monthly summary in decimal major units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub month: String,
    pub income: Decimal,
    /// Expenses as a positive magnitude
    pub expenses: Decimal,
    pub net: Decimal,
}
