//! Minimal pub/sub so a Property insert can wake the match-notifier worker
//! without the store depending on the workers crate.
//!
//! Deliberately smaller than a general hook engine: one event, one
//! broadcast, fire-and-forget subscribers. `Store::insert_property` emits
//! after the row commits.

use cqc_core::types::{PropertyId, TenantId};
use tokio::sync::broadcast;

#[derive(Debug, Clone)]
pub struct PropertyInserted {
    pub tenant_id: TenantId,
    pub property_id: PropertyId,
}

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PropertyInserted>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(256);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PropertyInserted> {
        self.tx.subscribe()
    }

    /// Broadcast is best-effort: no subscribers yet (e.g. notifier worker
    /// not started) is not an error, just a dropped event.
    pub fn publish(&self, event: PropertyInserted) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
