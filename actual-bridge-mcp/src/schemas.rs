//! MCP tool parameter schemas
//!
//! Defines the input parameter structures for all MCP tools.
//! All structs derive `Debug`, `Deserialize`, and `JsonSchema` as required by rmcp.

use schemars::JsonSchema;
use serde::Deserialize;

/// Parameters for `list_accounts` tool.
///
/// This tool takes no parameters, but we need an empty struct for the schema.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListAccountsParams {}

/// Parameters for `list_categories` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListCategoriesParams {}

/// Parameters for `get_monthly_summary` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct MonthlySummaryParams {
    /// Month in 'YYYY-MM' format (e.g., '2026-01').
    #[schemars(description = "Month in 'YYYY-MM' format (e.g., '2026-01')")]
    pub month: String,
}

/// Parameters for `add_transaction` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddTransactionParams {
    /// Account name, exact match from list_accounts.
    #[schemars(description = "Account name - MUST match exactly from list_accounts()")]
    pub account: String,

    /// Decimal amount; negative for expenses, positive for income.
    #[schemars(description = "Decimal amount - negative for expense (e.g., -10.50), positive for income")]
    pub amount: f64,

    /// Transaction date in 'YYYY-MM-DD' format.
    #[schemars(description = "Transaction date in 'YYYY-MM-DD' format")]
    pub date: String,

    /// Purchase description; not for transfers.
    #[schemars(description = "Purchase description (e.g., 'coffee', 'weekly groceries') - NOT for transfers")]
    pub notes: Option<String>,

    /// For transfers only: exact destination account name.
    #[schemars(description = "For transfers ONLY - exact destination account name from list_accounts()")]
    pub payee: Option<String>,

    /// Optional category name.
    #[schemars(description = "Optional category name (e.g., 'Food', 'Transport')")]
    pub category: Option<String>,

    /// Idempotency key; retries with the same key write once.
    #[schemars(description = "Optional idempotency key - retries with the same key write once")]
    pub request_id: Option<String>,

    /// Validate without writing.
    #[schemars(description = "Validate and resolve the transaction without writing it")]
    pub dry_run: Option<bool>,
}

/// Parameters for `edit_transaction` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct EditTransactionParams {
    /// The id of the transaction to edit.
    #[schemars(description = "The id of the transaction (get from query_transactions)")]
    pub transaction_id: String,

    /// New decimal amount, only if changing.
    #[schemars(description = "New decimal amount (only include if changing) - negative for expense")]
    pub amount: Option<f64>,

    /// New date in 'YYYY-MM-DD' format, only if changing.
    #[schemars(description = "New transaction date in 'YYYY-MM-DD' format (only include if changing)")]
    pub date: Option<String>,

    /// New category name, only if changing.
    #[schemars(description = "New category name (only include if changing)")]
    pub category: Option<String>,

    /// New description, only if changing.
    #[schemars(description = "New description (only include if changing)")]
    pub notes: Option<String>,

    /// Whether the transaction has cleared, only if changing.
    #[schemars(description = "Whether transaction has cleared - true/false (only include if changing)")]
    pub cleared: Option<bool>,

    /// New account name; moves the transaction.
    #[schemars(description = "New account name (only include if changing) - moves the transaction")]
    pub account: Option<String>,
}

/// Parameters for `delete_transaction` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteTransactionParams {
    /// The id of the transaction to delete.
    #[schemars(description = "The id of the transaction (get from query_transactions)")]
    pub transaction_id: String,
}

/// A single account name or a list of names.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AccountsArg {
    One(String),
    Many(Vec<String>),
}

/// Parameters for `query_transactions` tool. All fields optional.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryTransactionsParams {
    /// Account name(s): single string or list.
    #[schemars(description = "Account name(s): single string or list, e.g. 'Checking' or ['Checking', 'Savings']")]
    pub accounts: Option<AccountsArg>,

    /// Category name filter.
    #[schemars(description = "Category name filter, e.g. 'Food'")]
    pub category: Option<String>,

    /// Start date in 'YYYY-MM-DD' format (inclusive).
    #[schemars(description = "Start date in 'YYYY-MM-DD' format (inclusive)")]
    pub start_date: Option<String>,

    /// End date in 'YYYY-MM-DD' format (inclusive).
    #[schemars(description = "End date in 'YYYY-MM-DD' format (inclusive)")]
    pub end_date: Option<String>,

    /// Minimum amount, e.g. -100 for "expenses over $100".
    #[schemars(description = "Minimum amount (e.g., -100 for 'over $100 expenses')")]
    pub min_amount: Option<f64>,

    /// Maximum amount, e.g. 0 for "expenses only".
    #[schemars(description = "Maximum amount (e.g., 0 for 'expenses only')")]
    pub max_amount: Option<f64>,

    /// Text search in notes/payee.
    #[schemars(description = "Text search in notes/payee, e.g. 'coffee'")]
    pub search: Option<String>,

    /// Max results (default: 100).
    #[schemars(description = "Max results (default: 100)")]
    pub limit: Option<u32>,
}
