use cqc_core::types::TenantId;

/// Result of routing an inbound `(channel, channel_identity, text)` (spec §4.2).
#[derive(Debug, Clone)]
pub enum RouteOutcome {
    /// Routed to a tenant+vertical; forward the message for state-machine
    /// processing against the returned lead.
    Routed {
        tenant_id: TenantId,
        vertical: String,
    },
    /// No mapping could be established; emit the menu. No Lead is created
    /// (spec §4.2: "non-routable personal messages ... must not create a
    /// Lead record").
    MenuFallback,
}

/// A deep-link match: `start_<vertical>(_<tenant_hint>)?` or a bare
/// tenant-registered keyword substring (spec §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLinkMatch {
    pub vertical: String,
    pub tenant_hint: Option<String>,
}

/// Parse the deep-link payload grammar: `start_<vertical>(_<hint>)?`.
/// Bare keyword matching (substring search against tenant-registered
/// keywords) is handled separately in `router::resolve`, since it needs the
/// tenant's keyword list rather than a fixed grammar.
pub fn parse_deep_link(text: &str) -> Option<DeepLinkMatch> {
    let payload = text.trim().strip_prefix("start_")?;
    if payload.is_empty() {
        return None;
    }
    match payload.split_once('_') {
        Some((vertical, hint)) if !vertical.is_empty() && !hint.is_empty() => {
            Some(DeepLinkMatch {
                vertical: vertical.to_string(),
                tenant_hint: Some(hint.to_string()),
            })
        }
        _ => Some(DeepLinkMatch {
            vertical: payload.to_string(),
            tenant_hint: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vertical_and_hint() {
        let m = parse_deep_link("start_realty_agent101").unwrap();
        assert_eq!(m.vertical, "realty");
        assert_eq!(m.tenant_hint.as_deref(), Some("agent101"));
    }

    #[test]
    fn parses_bare_vertical() {
        let m = parse_deep_link("start_realty").unwrap();
        assert_eq!(m.vertical, "realty");
        assert_eq!(m.tenant_hint, None);
    }

    #[test]
    fn non_deep_link_text_is_none() {
        assert!(parse_deep_link("hello there").is_none());
    }
}
