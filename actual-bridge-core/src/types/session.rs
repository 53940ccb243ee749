//! Budget session and connection types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a budget session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Download in flight
    Loading,
    /// Budget downloaded and usable
    Ready,
    /// Last download attempt failed
    Failed,
}

/// One loaded remote budget, keyed by sync id.
///
/// Lifecycle: `Loading -> {Ready, Failed}`. Failed entries are evicted so
/// the next request for the same sync id retries from scratch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetSession {
    /// Opaque remote budget identifier
    pub sync_id: String,
    /// When the download completed
    pub loaded_at: DateTime<Utc>,
    /// Current session status
    pub status: SessionStatus,
}

/// Connection parameters for the ledger backend (process-wide singleton).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Remote ledger server URL
    pub server_url: String,
    /// Server credential
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Configured fallback budget used when a request carries no sync id.
#[derive(Debug, Clone, Default)]
pub struct BudgetDefaults {
    /// Default sync id, if the deployment pins one budget
    pub sync_id: Option<String>,
    /// File password for the default budget
    pub file_password: Option<String>,
}
