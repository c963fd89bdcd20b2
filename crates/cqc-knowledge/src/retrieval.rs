use cqc_core::types::Language;
use cqc_store::types::{Goal, Knowledge};
use cqc_store::Store;
use tracing::instrument;

/// Default top-k when a caller doesn't specify one (spec §4.4).
pub const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Clone)]
pub struct ScoredEntry {
    pub entry: Knowledge,
    pub score: u32,
}

/// Stateless keyword+priority retrieval over a tenant's active knowledge
/// base for one language (spec §4.4):
/// - +2 per exact keyword present in the query (case-insensitive).
/// - +1 per title token present in the query.
/// - Tiebreak by entry priority, descending.
/// Only entries scoring > 0 are returned, capped at `top_k`.
#[instrument(skip(store, query))]
pub fn retrieve(
    store: &Store,
    tenant_id: &cqc_core::types::TenantId,
    language: Language,
    query: &str,
    top_k: usize,
) -> cqc_store::Result<Vec<ScoredEntry>> {
    let entries = store.active_knowledge(tenant_id, language)?;
    let query_lower = query.to_lowercase();

    let mut scored: Vec<ScoredEntry> = entries
        .into_iter()
        .map(|entry| {
            let score = score_entry(&entry, &query_lower);
            ScoredEntry { entry, score }
        })
        .filter(|s| s.score > 0)
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.entry.priority.cmp(&a.entry.priority))
    });
    scored.truncate(top_k);
    Ok(scored)
}

fn score_entry(entry: &Knowledge, query_lower: &str) -> u32 {
    let mut score = 0u32;
    for keyword in &entry.keywords {
        if query_lower.contains(&keyword.to_lowercase()) {
            score += 2;
        }
    }
    for token in entry.title.split_whitespace() {
        if query_lower.contains(&token.to_lowercase()) {
            score += 1;
        }
    }
    score
}

/// Trust-snippet specialisation: queries like "escrow", "safety" (spec §4.4).
pub fn trust_snippet(
    store: &Store,
    tenant_id: &cqc_core::types::TenantId,
    language: Language,
    query: &str,
) -> cqc_store::Result<Option<Knowledge>> {
    let augmented = format!("{query} escrow safety trust");
    Ok(retrieve(store, tenant_id, language, &augmented, 1)?
        .into_iter()
        .next()
        .map(|s| s.entry))
}

/// Education-snippet specialisation: queries like "ROI", "Golden Visa",
/// keyed by the lead's goal (spec §4.4).
pub fn education_snippet(
    store: &Store,
    tenant_id: &cqc_core::types::TenantId,
    language: Language,
    query: &str,
    goal: Goal,
) -> cqc_store::Result<Option<Knowledge>> {
    let goal_keyword = match goal {
        Goal::Investment => "roi investment",
        Goal::Living => "lifestyle living",
        Goal::Residency => "golden visa residency",
        Goal::Rent => "rent tenancy",
    };
    let augmented = format!("{query} {goal_keyword}");
    Ok(retrieve(store, tenant_id, language, &augmented, 1)?
        .into_iter()
        .next()
        .map(|s| s.entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqc_core::types::TenantId;
    use cqc_store::types::Tenant;

    fn seed_tenant(store: &Store) -> TenantId {
        let tenant = Tenant {
            id: TenantId::default(),
            name: "Acme Realty".into(),
            default_language: Language::En,
            branding_colour: None,
            admin_channel_identity: None,
            subscription_active: true,
            verticals: vec!["realty".into()],
        };
        store.create_tenant(&tenant).unwrap();
        tenant.id
    }

    fn entry(tenant_id: &TenantId, title: &str, keywords: &[&str], priority: u32) -> Knowledge {
        Knowledge {
            id: cqc_core::types::KnowledgeId::default(),
            tenant_id: tenant_id.clone(),
            category: "general".into(),
            title: title.into(),
            content: "content".into(),
            language: Language::En,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            priority,
            is_active: true,
        }
    }

    #[test]
    fn scores_keyword_and_title_matches() {
        let store = Store::in_memory().unwrap();
        let tenant_id = seed_tenant(&store);
        let escrow = entry(&tenant_id, "Escrow Protection", &["escrow"], 1);
        store.insert_knowledge(&escrow).unwrap();

        let results = retrieve(&store, &tenant_id, Language::En, "how does escrow work", 3).unwrap();
        assert_eq!(results.len(), 1);
        // +2 keyword ("escrow") +1 title token ("escrow") = 3
        assert_eq!(results[0].score, 3);
    }

    #[test]
    fn zero_score_entries_are_excluded() {
        let store = Store::in_memory().unwrap();
        let tenant_id = seed_tenant(&store);
        store
            .insert_knowledge(&entry(&tenant_id, "Payment Plans", &["payment"], 1))
            .unwrap();

        let results = retrieve(&store, &tenant_id, Language::En, "what is the weather", 3).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn ties_break_on_priority_descending() {
        let store = Store::in_memory().unwrap();
        let tenant_id = seed_tenant(&store);
        store
            .insert_knowledge(&entry(&tenant_id, "Escrow Basics", &["escrow"], 1))
            .unwrap();
        store
            .insert_knowledge(&entry(&tenant_id, "Escrow Advanced", &["escrow"], 9))
            .unwrap();

        let results = retrieve(&store, &tenant_id, Language::En, "escrow", 2).unwrap();
        assert_eq!(results[0].entry.title, "Escrow Advanced");
    }
}
