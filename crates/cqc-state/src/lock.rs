use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, MutexGuard};

/// Per-lead advisory lock manager, keyed by `(tenant_id, channel_identity)`
/// (spec §5). Acquired at the top of `process`, released on return (RAII via
/// the returned guard). Scoped rather than a single global map, with idle
/// entries evicted so the manager doesn't grow unbounded across a long-lived
/// process (spec §9: "scopes that map to a lock manager with an eviction
/// policy ... drop locks with no waiters after idle").
#[derive(Default)]
pub struct LeadLockManager {
    locks: DashMap<(String, String), Arc<Mutex<()>>>,
}

impl LeadLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, tenant_id: &str, channel_identity: &str) -> OwnedLeadLock {
        let key = (tenant_id.to_string(), channel_identity.to_string());
        let mutex = self
            .locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        OwnedLeadLock { mutex }
    }

    /// Drop entries whose `Arc` has no other holder. Safe to call opportunistically
    /// from a worker tick; never required for correctness since expired entries
    /// just mean a fresh `Mutex` gets created on next acquire.
    pub fn evict_idle(&self) {
        self.locks.retain(|_, mutex| Arc::strong_count(mutex) > 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }
}

/// Holds the `Arc<Mutex<()>>` alive for the lifetime of the lock acquisition,
/// so `evict_idle` can tell it's still in use.
pub struct OwnedLeadLock {
    mutex: Arc<Mutex<()>>,
}

impl OwnedLeadLock {
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.mutex.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serialises_access_to_the_same_lead() {
        let manager = LeadLockManager::new();
        let handle_a = manager.acquire("t1", "chat:1").await;
        let handle_b = manager.acquire("t1", "chat:1").await;

        let guard = handle_a.lock().await;
        let try_result = handle_b.mutex.try_lock();
        assert!(try_result.is_err(), "second acquirer should find it locked");
        drop(guard);
    }

    #[tokio::test]
    async fn evicts_locks_with_no_outstanding_holders() {
        let manager = LeadLockManager::new();
        {
            let _handle = manager.acquire("t1", "chat:1").await;
            assert_eq!(manager.len(), 1);
        }
        manager.evict_idle();
        assert_eq!(manager.len(), 0);
    }
}
