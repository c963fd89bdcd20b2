//! Session cache keys and the route mapping they carry.
//!
//! Per spec §6, keys are `session:{tenant_id}:{channel_identity}` (reserved
//! for dialogue-context extensions) and `route:{channel_identity}` (the
//! Channel Router's deep-link/session-memory mapping). Both carry a 24-hour
//! TTL, refreshed on each hit.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

/// A route key: `route:{channel_identity}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteKey(pub String);

impl RouteKey {
    pub fn new(channel_identity: &str) -> Self {
        Self(format!("route:{channel_identity}"))
    }

    pub fn format(&self) -> String {
        self.0.clone()
    }

    pub fn parse(s: &str) -> Result<Self> {
        if !s.starts_with("route:") || s.len() <= "route:".len() {
            return Err(SessionError::InvalidKey(format!(
                "missing 'route:' prefix or empty identity: {s}"
            )));
        }
        Ok(Self(s.to_string()))
    }
}

impl std::fmt::Display for RouteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The Channel Router's (vertical, tenant hint) binding for a channel
/// identity, set by a deep-link and extended on session-memory hits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteMapping {
    pub tenant_id: String,
    pub vertical: String,
    pub tenant_hint: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_key_roundtrip() {
        let key = RouteKey::new("+971501234567");
        let s = key.format();
        assert_eq!(s, "route:+971501234567");
        let parsed = RouteKey::parse(&s).expect("parse failed");
        assert_eq!(parsed, key);
    }

    #[test]
    fn route_key_rejects_missing_prefix() {
        assert!(RouteKey::parse("+971501234567").is_err());
    }

    #[test]
    fn route_key_rejects_empty_identity() {
        assert!(RouteKey::parse("route:").is_err());
    }
}
