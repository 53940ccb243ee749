//! Per-request budget selection.

use std::sync::Arc;

use crate::error::{BridgeError, BridgeResult};
use crate::services::connection_manager::ConnectionManager;
use crate::types::{BudgetDefaults, BudgetSession};

/// Resolves the effective target budget for one request: an explicit
/// request-scoped sync id wins, otherwise the configured default applies.
pub struct SessionResolver {
    connections: Arc<ConnectionManager>,
    defaults: BudgetDefaults,
}

impl SessionResolver {
    /// Create a resolver over `connections` with configured `defaults`.
    #[must_use]
    pub fn new(connections: Arc<ConnectionManager>, defaults: BudgetDefaults) -> Self {
        Self {
            connections,
            defaults,
        }
    }

    /// Ensure the target budget is loaded and return its session.
    ///
    /// Steady state (budget already `Ready`) is a single map read; no
    /// network call is made.
    pub async fn resolve(
        &self,
        request_sync_id: Option<&str>,
        request_password: Option<&str>,
    ) -> BridgeResult<BudgetSession> {
        let (sync_id, password) = match request_sync_id {
            Some(id) => (id, request_password),
            None => match self.defaults.sync_id.as_deref() {
                Some(id) => (id, self.defaults.file_password.as_deref()),
                None => return Err(BridgeError::MissingSyncId),
            },
        };
        self.connections.ensure_budget(sync_id, password).await
    }
}
