use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, instrument, warn};

use crate::types::{RouteKey, RouteMapping};

/// Ephemeral per-channel-identity routing cache with TTL (spec §2 "Session
/// Cache": "ephemeral per-user routing and conversation context with TTL").
///
/// Unlike `skynet-sessions::SessionManager`, which persists to SQLite for
/// restart durability, this cache is intentionally non-durable: spec §4.10
/// requires that a cache outage degrade to "treat as empty, read tenant/lead
/// from durable store" rather than block the turn, so there is nothing here
/// worth surviving a restart.
pub struct SessionCache {
    routes: DashMap<String, (RouteMapping, Instant)>,
    ttl: Duration,
}

impl SessionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            routes: DashMap::new(),
            ttl,
        }
    }

    /// Set/overwrite a route mapping with a fresh TTL. Used by deep-link
    /// matches (spec §4.2 precedence 1), which always win over whatever was
    /// previously mapped.
    #[instrument(skip(self, mapping), fields(key = %key))]
    pub fn put_route(&self, key: &RouteKey, mapping: RouteMapping) {
        self.routes
            .insert(key.format(), (mapping, Instant::now() + self.ttl));
    }

    /// Read a route mapping, extending its TTL on hit (sliding window, spec
    /// §4.2 precedence 2). Returns `None` on miss or expiry.
    #[instrument(skip(self), fields(key = %key))]
    pub fn get_route(&self, key: &RouteKey) -> Option<RouteMapping> {
        let mut entry = self.routes.get_mut(&key.format())?;
        if entry.1 < Instant::now() {
            drop(entry);
            self.routes.remove(&key.format());
            debug!("route cache entry expired");
            return None;
        }
        entry.1 = Instant::now() + self.ttl;
        Some(entry.0.clone())
    }

    /// Drop all entries past their TTL. Call periodically from a worker tick
    /// to bound memory; reads already self-evict on expiry so this is purely
    /// a housekeeping sweep, never required for correctness.
    pub fn sweep_expired(&self) {
        let now = Instant::now();
        let before = self.routes.len();
        self.routes.retain(|_, (_, expires_at)| *expires_at >= now);
        let removed = before - self.routes.len();
        if removed > 0 {
            warn!(removed, "swept expired route cache entries");
        }
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(cqc_core::config::SESSION_TTL_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> RouteMapping {
        RouteMapping {
            tenant_id: "tenant-1".into(),
            vertical: "realty".into(),
            tenant_hint: Some("agent101".into()),
        }
    }

    #[test]
    fn put_then_get_route_hits() {
        let cache = SessionCache::new(Duration::from_secs(60));
        let key = RouteKey::new("+971501234567");
        cache.put_route(&key, mapping());
        let got = cache.get_route(&key).expect("expected hit");
        assert_eq!(got.vertical, "realty");
    }

    #[test]
    fn expired_route_is_a_miss() {
        let cache = SessionCache::new(Duration::from_millis(1));
        let key = RouteKey::new("+971501234567");
        cache.put_route(&key, mapping());
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get_route(&key).is_none());
    }

    #[test]
    fn get_route_extends_ttl_on_hit() {
        let cache = SessionCache::new(Duration::from_millis(30));
        let key = RouteKey::new("+971501234567");
        cache.put_route(&key, mapping());
        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.get_route(&key).is_some(), "first hit within TTL");
        std::thread::sleep(Duration::from_millis(20));
        assert!(
            cache.get_route(&key).is_some(),
            "second hit should have been refreshed by the first"
        );
    }
}
