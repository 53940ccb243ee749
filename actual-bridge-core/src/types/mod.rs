//! Shared type definitions for the bridge core.

mod account;
mod session;
mod transaction;

pub use account::{Account, AccountView, Category, CategoryView};
pub use session::{BudgetDefaults, BudgetSession, ConnectionConfig, SessionStatus};
pub use transaction::{
    BudgetMonth, DeleteReceipt, DeletedSnapshot, EditRequest, MonthlySummary, NameOrList,
    NewTransaction, QueryFilter, TransactionDraft, TransactionPatch, TransactionReceipt,
    TransactionRecord, TransactionView,
};
