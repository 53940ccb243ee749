//! Shared application state.

use actual_bridge_core::ServiceContext;

/// State handed to every handler via `web::Data`.
pub struct AppState {
    /// Core services around the ledger engine.
    pub context: ServiceContext,
    /// Shared secret for `/mcp` routes. `None` disables auth.
    pub api_key: Option<String>,
}
