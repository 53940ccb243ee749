//! Best-effort in-memory idempotency tracking.
//!
//! A key is claimed before the write and fulfilled with the assigned
//! transaction id afterwards. The claim is a compare-and-set under one
//! lock, so concurrent retries of the same key serialize here: exactly
//! one caller gets [`Claim::New`] and owns the write, everyone else waits
//! for it to settle and replays the original id. Scope is the process
//! lifetime; the registry is size-capped with insertion-order eviction
//! to keep memory bounded.

use std::collections::{HashMap, VecDeque};
use std::pin::pin;

use tokio::sync::{Mutex, Notify};

/// Default capacity; oldest keys are evicted past this point.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Outcome of [`IdempotencyRegistry::claim`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// First use of the key. The caller owns the write and must settle
    /// the claim via `fulfill` (success) or `release` (failure).
    New,
    /// The key was already applied; carries the original transaction id.
    Replay(String),
}

enum Entry {
    /// Claimed, write in flight.
    Pending,
    /// Applied; holds the assigned transaction id.
    Done(String),
}

/// Capped registry of claimed idempotency keys.
pub struct IdempotencyRegistry {
    inner: Mutex<RegistryInner>,
    /// Signalled whenever a pending claim settles.
    settled: Notify,
}

struct RegistryInner {
    capacity: usize,
    seen: HashMap<String, Entry>,
    order: VecDeque<String>,
}

impl RegistryInner {
    fn insert_pending(&mut self, key: &str) {
        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                let _ = self.seen.remove(&oldest);
            }
        }
        self.seen.insert(key.to_string(), Entry::Pending);
        self.order.push_back(key.to_string());
    }
}

impl IdempotencyRegistry {
    /// Registry with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Registry holding at most `capacity` keys.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                capacity: capacity.max(1),
                seen: HashMap::new(),
                order: VecDeque::new(),
            }),
            settled: Notify::new(),
        }
    }

    /// Claim `key`, or replay the id it settled with. While another caller
    /// holds a pending claim on the same key this waits for it to settle,
    /// so check-then-insert is atomic from the caller's point of view.
    pub async fn claim(&self, key: &str) -> Claim {
        loop {
            // Register for wakeups before re-checking, so a settle landing
            // between the lock drop and the await is not missed.
            let mut settled = pin!(self.settled.notified());
            settled.as_mut().enable();
            {
                let mut inner = self.inner.lock().await;
                match inner.seen.get(key) {
                    Some(Entry::Done(id)) => return Claim::Replay(id.clone()),
                    Some(Entry::Pending) => {}
                    None => {
                        inner.insert_pending(key);
                        return Claim::New;
                    }
                }
            }
            settled.await;
        }
    }

    /// Settle a claimed key with the assigned transaction id and wake
    /// waiters. The first settlement wins.
    pub async fn fulfill(&self, key: &str, transaction_id: &str) {
        {
            let mut inner = self.inner.lock().await;
            if let Some(entry) = inner.seen.get_mut(key) {
                if matches!(entry, Entry::Pending) {
                    *entry = Entry::Done(transaction_id.to_string());
                }
            }
        }
        self.settled.notify_waiters();
    }

    /// Drop a pending claim after a failed write so a retry can claim the
    /// key again. Fulfilled keys are left alone.
    pub async fn release(&self, key: &str) {
        {
            let mut inner = self.inner.lock().await;
            if matches!(inner.seen.get(key), Some(Entry::Pending)) {
                let _ = inner.seen.remove(key);
                inner.order.retain(|k| k != key);
            }
        }
        self.settled.notify_waiters();
    }

    /// Transaction id a key settled with, if any. Pending claims read as
    /// absent.
    pub async fn lookup(&self, key: &str) -> Option<String> {
        match self.inner.lock().await.seen.get(key) {
            Some(Entry::Done(id)) => Some(id.clone()),
            _ => None,
        }
    }
}

impl Default for IdempotencyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn first_claim_is_new_then_replays_after_fulfillment() {
        let registry = IdempotencyRegistry::new();
        assert_eq!(registry.claim("req-1").await, Claim::New);
        assert_eq!(registry.lookup("req-1").await, None);

        registry.fulfill("req-1", "tx-1").await;
        assert_eq!(registry.claim("req-1").await, Claim::Replay("tx-1".to_string()));
        assert_eq!(registry.lookup("req-1").await, Some("tx-1".to_string()));
    }

    #[tokio::test]
    async fn concurrent_claim_waits_for_the_owner_to_settle() {
        let registry = Arc::new(IdempotencyRegistry::new());
        assert_eq!(registry.claim("req-1").await, Claim::New);

        let waiter = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.claim("req-1").await })
        };
        // Give the waiter time to block on the pending entry.
        tokio::time::sleep(Duration::from_millis(20)).await;

        registry.fulfill("req-1", "tx-1").await;
        assert_eq!(waiter.await.unwrap(), Claim::Replay("tx-1".to_string()));
    }

    #[tokio::test]
    async fn released_key_can_be_claimed_again() {
        let registry = Arc::new(IdempotencyRegistry::new());
        assert_eq!(registry.claim("req-1").await, Claim::New);

        let waiter = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.claim("req-1").await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        // The owner's write failed; the waiter takes over the claim.
        registry.release("req-1").await;
        assert_eq!(waiter.await.unwrap(), Claim::New);
    }

    #[tokio::test]
    async fn first_fulfillment_wins() {
        let registry = IdempotencyRegistry::new();
        assert_eq!(registry.claim("req-1").await, Claim::New);
        registry.fulfill("req-1", "tx-1").await;
        registry.fulfill("req-1", "tx-2").await;
        assert_eq!(registry.lookup("req-1").await, Some("tx-1".to_string()));
    }

    #[tokio::test]
    async fn oldest_key_is_evicted_at_capacity() {
        let registry = IdempotencyRegistry::with_capacity(2);
        for (key, id) in [("req-1", "tx-1"), ("req-2", "tx-2"), ("req-3", "tx-3")] {
            assert_eq!(registry.claim(key).await, Claim::New);
            registry.fulfill(key, id).await;
        }

        assert_eq!(registry.lookup("req-1").await, None);
        assert_eq!(registry.lookup("req-2").await, Some("tx-2".to_string()));
        assert_eq!(registry.lookup("req-3").await, Some("tx-3".to_string()));
    }
}
