//! Business logic service layer.

mod connection_manager;
mod entity_resolver;
mod idempotency;
mod session_resolver;
mod transaction_service;

pub use connection_manager::ConnectionManager;
pub use entity_resolver::{EntityResolver, NameIndex};
pub use idempotency::IdempotencyRegistry;
pub use session_resolver::SessionResolver;
pub use transaction_service::TransactionService;

use std::sync::Arc;

use crate::engine::LedgerEngine;
use crate::types::{BudgetDefaults, ConnectionConfig};

/// Service context holding every dependency an API surface needs.
///
/// The platform layer (HTTP server, tool server) builds one of these around
/// a concrete engine and hands it out as shared state.
pub struct ServiceContext {
    /// Connection and budget-session lifecycle.
    pub connections: Arc<ConnectionManager>,
    /// Per-request budget selection.
    pub sessions: SessionResolver,
    /// Account/category name resolution.
    pub entities: EntityResolver,
    /// Transaction mutation pipeline and queries.
    pub transactions: TransactionService,
}

impl ServiceContext {
    /// Create the context around `engine`.
    #[must_use]
    pub fn new(
        engine: Arc<dyn LedgerEngine>,
        config: ConnectionConfig,
        defaults: BudgetDefaults,
    ) -> Self {
        let connections = Arc::new(ConnectionManager::new(Arc::clone(&engine), config));
        Self {
            sessions: SessionResolver::new(Arc::clone(&connections), defaults),
            entities: EntityResolver::new(Arc::clone(&engine)),
            transactions: TransactionService::new(engine),
            connections,
        }
    }
}
