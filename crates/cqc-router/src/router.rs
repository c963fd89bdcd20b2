use cqc_core::types::TenantId;
use cqc_sessions::{RouteKey, RouteMapping, SessionCache};
use cqc_store::Store;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::types::{parse_deep_link, DeepLinkMatch, RouteOutcome};

/// Resolves an inbound `(channel_identity, text)` to a tenant+vertical per
/// spec §4.2's fixed precedence: deep-link match, then session memory, then
/// menu fallback. Grounded in `skynet_users::resolver::UserResolver::resolve`'s
/// cache-then-db shape.
pub struct ChannelRouter<'a> {
    store: &'a Store,
    sessions: &'a SessionCache,
}

impl<'a> ChannelRouter<'a> {
    pub fn new(store: &'a Store, sessions: &'a SessionCache) -> Self {
        Self { store, sessions }
    }

    /// `keyword_verticals` lets a caller also match a bare tenant-registered
    /// keyword (e.g. "property") appearing anywhere in the text, per spec §6,
    /// without requiring the `start_<vertical>` grammar.
    #[instrument(skip(self, text), fields(channel_identity = %channel_identity))]
    pub fn resolve(&self, channel_identity: &str, text: &str) -> Result<RouteOutcome> {
        let key = RouteKey::new(channel_identity);

        if let Some(m) = self.extract_vertical(text) {
            if let Some(tenant) = self.store.find_tenant_by_vertical(&m.vertical)? {
                debug!(vertical = %m.vertical, tenant_hint = ?m.tenant_hint, tenant_id = %tenant.id, "deep-link match");
                let mapping = RouteMapping {
                    tenant_id: tenant.id.to_string(),
                    vertical: m.vertical.clone(),
                    tenant_hint: m.tenant_hint,
                };
                // Deep-link always wins and overwrites whatever was cached.
                self.sessions.put_route(&key, mapping);
                return Ok(RouteOutcome::Routed {
                    tenant_id: tenant.id,
                    vertical: m.vertical,
                });
            }
        }

        if let Some(mapping) = self.sessions.get_route(&key) {
            debug!(vertical = %mapping.vertical, "session-memory match");
            return Ok(RouteOutcome::Routed {
                tenant_id: TenantId::from(mapping.tenant_id),
                vertical: mapping.vertical,
            });
        }

        debug!("no route resolved, falling back to menu");
        Ok(RouteOutcome::MenuFallback)
    }

    /// Deep-link grammar first; otherwise a bare keyword substring against
    /// every tenant-registered vertical name (spec §6's plain-keyword case).
    /// A bare keyword carries no tenant hint.
    fn extract_vertical(&self, text: &str) -> Option<DeepLinkMatch> {
        if let Some(m) = parse_deep_link(text) {
            return Some(m);
        }
        let lower = text.to_lowercase();
        lower
            .split_whitespace()
            .find(|word| word.chars().all(|c| c.is_alphanumeric()))
            .map(|w| w.to_string())
            .filter(|candidate| {
                self.store
                    .find_tenant_by_vertical(candidate)
                    .ok()
                    .flatten()
                    .is_some()
            })
            .map(|vertical| DeepLinkMatch { vertical, tenant_hint: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqc_core::types::Language;
    use cqc_store::types::Tenant;
    use std::time::Duration;

    fn seed_tenant(store: &Store, verticals: &[&str]) -> TenantId {
        let tenant = Tenant {
            id: TenantId::default(),
            name: "Acme Realty".into(),
            default_language: Language::En,
            branding_colour: None,
            admin_channel_identity: None,
            subscription_active: true,
            verticals: verticals.iter().map(|v| v.to_string()).collect(),
        };
        store.create_tenant(&tenant).unwrap();
        tenant.id
    }

    #[test]
    fn deep_link_routes_and_caches() {
        let store = Store::in_memory().unwrap();
        let tenant_id = seed_tenant(&store, &["realty"]);
        let sessions = SessionCache::new(Duration::from_secs(60));
        let router = ChannelRouter::new(&store, &sessions);

        let outcome = router.resolve("chat:1", "start_realty").unwrap();
        match outcome {
            RouteOutcome::Routed {
                tenant_id: got,
                vertical,
            } => {
                assert_eq!(got, tenant_id);
                assert_eq!(vertical, "realty");
            }
            RouteOutcome::MenuFallback => panic!("expected a route"),
        }

        // A follow-up message with no deep-link falls through to the cached
        // session mapping set by the deep-link above.
        let outcome2 = router.resolve("chat:1", "hi").unwrap();
        assert!(matches!(outcome2, RouteOutcome::Routed { .. }));
    }

    #[test]
    fn bare_keyword_matches_registered_vertical() {
        let store = Store::in_memory().unwrap();
        seed_tenant(&store, &["property"]);
        let sessions = SessionCache::new(Duration::from_secs(60));
        let router = ChannelRouter::new(&store, &sessions);

        let outcome = router.resolve("chat:2", "looking for property here").unwrap();
        assert!(matches!(outcome, RouteOutcome::Routed { .. }));
    }

    #[test]
    fn deep_link_tenant_hint_is_cached_with_the_route() {
        let store = Store::in_memory().unwrap();
        seed_tenant(&store, &["realty"]);
        let sessions = SessionCache::new(Duration::from_secs(60));
        let router = ChannelRouter::new(&store, &sessions);

        router.resolve("chat:4", "start_realty_agent101").unwrap();

        let mapping = sessions.get_route(&RouteKey::new("chat:4")).expect("route must be cached");
        assert_eq!(mapping.vertical, "realty");
        assert_eq!(mapping.tenant_hint.as_deref(), Some("agent101"));
    }

    #[test]
    fn unroutable_message_falls_back_to_menu_without_creating_a_lead() {
        let store = Store::in_memory().unwrap();
        seed_tenant(&store, &["realty"]);
        let sessions = SessionCache::new(Duration::from_secs(60));
        let router = ChannelRouter::new(&store, &sessions);

        let outcome = router.resolve("chat:3", "hello there").unwrap();
        assert!(matches!(outcome, RouteOutcome::MenuFallback));
    }
}
