//! Actual Bridge Core Library
//!
//! Business logic for bridging a personal-finance ledger engine to
//! HTTP and tool-server surfaces:
//! - connection and budget-session lifecycle (Connection Manager)
//! - per-request budget selection (Session Resolver)
//! - name/id resolution for accounts and categories (Entity Resolver)
//! - validated transaction mutations and queries
//!
//! The engine itself is abstracted behind the [`engine::LedgerEngine`]
//! trait, so the same services back the HTTP server and the MCP adapter.

pub mod engine;
pub mod error;
pub mod money;
pub mod services;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{BridgeError, BridgeResult};
pub use services::ServiceContext;
