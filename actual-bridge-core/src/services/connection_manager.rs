//! Budget-session lifecycle management.
//!
//! Owns the single engine connection and the map of downloaded budgets.
//! Budget loading is serialized per sync id: the local cache directory for
//! a budget is a single-writer resource, so a second request arriving while
//! a download is in flight waits for the first instead of starting its own.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, OnceCell, RwLock};

use crate::engine::LedgerEngine;
use crate::error::BridgeResult;
use crate::types::{BudgetSession, ConnectionConfig, SessionStatus};

/// Lifecycle owner for the engine connection and loaded budgets.
pub struct ConnectionManager {
    engine: Arc<dyn LedgerEngine>,
    config: ConnectionConfig,
    /// Set exactly once, on the first successful `init`. A failed init
    /// leaves the cell empty so the next request retries.
    connected: OnceCell<()>,
    /// Ready/Loading sessions keyed by sync id. Entries are never evicted
    /// except on load failure; the map grows with the number of distinct
    /// budgets served, which is accepted.
    sessions: RwLock<HashMap<String, BudgetSession>>,
    /// Per-sync-id download locks. Guards the engine download so concurrent
    /// callers for the same budget observe a single in-flight download.
    load_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    shutdown_once: OnceCell<()>,
}

impl ConnectionManager {
    /// Create a manager for `engine` connecting with `config`.
    #[must_use]
    pub fn new(engine: Arc<dyn LedgerEngine>, config: ConnectionConfig) -> Self {
        Self {
            engine,
            config,
            connected: OnceCell::new(),
            sessions: RwLock::new(HashMap::new()),
            load_locks: Mutex::new(HashMap::new()),
            shutdown_once: OnceCell::new(),
        }
    }

    /// Open the engine connection. Idempotent: the engine `init` runs at
    /// most once per process; later calls are no-ops.
    pub async fn ensure_connected(&self) -> BridgeResult<()> {
        self.connected
            .get_or_try_init(|| async {
                log::info!("Connecting to ledger server at {}", self.config.server_url);
                self.engine.init(&self.config).await
            })
            .await?;
        Ok(())
    }

    /// Return the `Ready` session for `sync_id`, downloading the budget if
    /// it is not cached yet.
    ///
    /// Cache hits return without any engine call. A failed download leaves
    /// no entry behind, so the next call for that sync id retries.
    pub async fn ensure_budget(
        &self,
        sync_id: &str,
        password: Option<&str>,
    ) -> BridgeResult<BudgetSession> {
        self.ensure_connected().await?;

        if let Some(session) = self.ready_session(sync_id).await {
            return Ok(session);
        }

        let lock = self.load_lock(sync_id).await;
        let _guard = lock.lock().await;

        // The first loader may have finished while we waited on its lock.
        if let Some(session) = self.ready_session(sync_id).await {
            return Ok(session);
        }

        self.sessions.write().await.insert(
            sync_id.to_string(),
            BudgetSession {
                sync_id: sync_id.to_string(),
                loaded_at: Utc::now(),
                status: SessionStatus::Loading,
            },
        );

        log::info!("Downloading budget {sync_id}");
        match self.engine.download_budget(sync_id, password).await {
            Ok(()) => {
                let session = BudgetSession {
                    sync_id: sync_id.to_string(),
                    loaded_at: Utc::now(),
                    status: SessionStatus::Ready,
                };
                self.sessions
                    .write()
                    .await
                    .insert(sync_id.to_string(), session.clone());
                log::info!("Budget {sync_id} ready");
                Ok(session)
            }
            Err(e) => {
                // Evict so a future call restarts from Loading.
                self.sessions.write().await.remove(sync_id);
                log::warn!("Budget {sync_id} failed to load: {e}");
                Err(e)
            }
        }
    }

    /// Release the engine connection. Safe to call more than once.
    pub async fn shutdown(&self) -> BridgeResult<()> {
        self.shutdown_once
            .get_or_try_init(|| async {
                log::info!("Shutting down ledger engine");
                self.engine.shutdown().await
            })
            .await?;
        Ok(())
    }

    /// Whether the engine connection has been opened.
    pub fn is_connected(&self) -> bool {
        self.connected.initialized()
    }

    /// Sync ids of budgets currently cached as `Ready`, sorted.
    pub async fn cached_sync_ids(&self) -> Vec<String> {
        let sessions = self.sessions.read().await;
        let mut ids: Vec<String> = sessions
            .values()
            .filter(|s| s.status == SessionStatus::Ready)
            .map(|s| s.sync_id.clone())
            .collect();
        ids.sort();
        ids
    }

    async fn ready_session(&self, sync_id: &str) -> Option<BudgetSession> {
        self.sessions
            .read()
            .await
            .get(sync_id)
            .filter(|s| s.status == SessionStatus::Ready)
            .cloned()
    }

    async fn load_lock(&self, sync_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.load_locks.lock().await;
        Arc::clone(
            locks
                .entry(sync_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }
}
