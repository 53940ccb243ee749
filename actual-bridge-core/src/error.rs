//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

/// Core layer error type
#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum BridgeError {
    /// Ledger backend unreachable or credentials rejected
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Budget download/decrypt failed for a sync id
    #[error("Failed to load budget {sync_id}: {message}")]
    BudgetLoadError { sync_id: String, message: String },

    /// Request carried no sync id and no default is configured
    #[error("Missing budget sync id: provide the x-actual-sync-id header or configure a default")]
    MissingSyncId,

    /// Account name/id has no match
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Category name/id has no match
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Transaction id has no match
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    /// Missing/malformed fields in a mutation payload
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The engine rejected an otherwise-valid operation
    #[error("Upstream engine error: {0}")]
    UpstreamError(String),

    /// Engine call exceeded the request deadline
    #[error("Gateway timeout: {0}")]
    GatewayTimeout(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl BridgeError {
    /// Whether this is expected behavior (bad input, missing resource) rather
    /// than a server fault. Used for log level and HTTP status classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error`
    /// when returning `false`.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::MissingSyncId
                | Self::AccountNotFound(_)
                | Self::CategoryNotFound(_)
                | Self::TransactionNotFound(_)
                | Self::ValidationError(_)
        )
    }
}

/// Core layer Result type alias
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;
