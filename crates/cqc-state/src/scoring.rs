use chrono::Utc;
use cqc_store::types::{Lead, Temperature};

/// `lead_score = engagement(≤40) + qualification(≤40) + recency(≤20)` (spec §4.5).
/// Recomputed on every inbound turn and on worker-driven state changes.
pub fn recompute(lead: &mut Lead) {
    let score = engagement_score(lead) + qualification_score(lead) + recency_score(lead);
    lead.lead_score = score.min(100);
    lead.temperature = Temperature::from_score(lead.lead_score);
}

fn engagement_score(lead: &Lead) -> u32 {
    let qr = (lead.qr_scan_count * 3).min(15);
    let catalog = (lead.catalog_views * 2).min(10);
    let messages = lead.messages_count.min(10);
    let voice = if lead.voice_messages_count > 0 { 5 } else { 0 };
    (qr + catalog + messages + voice).min(40)
}

fn qualification_score(lead: &Lead) -> u32 {
    let mut score = 0u32;
    if lead.phone.is_some() {
        score += 10;
    }
    if lead.budget_min.is_some() && lead.budget_max.is_some() {
        score += 10;
    }
    if lead.transaction_type.is_some() {
        score += 5;
    }
    if lead.property_type.is_some() {
        score += 5;
    }
    if !lead.preferred_locations.is_empty() {
        score += 5;
    }
    if lead.payment_method.is_some() {
        score += 5;
    }
    score.min(40)
}

fn recency_score(lead: &Lead) -> u32 {
    let elapsed = Utc::now().signed_duration_since(lead.last_interaction);
    if elapsed < chrono::Duration::hours(1) {
        20
    } else if elapsed < chrono::Duration::hours(6) {
        15
    } else if elapsed < chrono::Duration::hours(24) {
        10
    } else if elapsed < chrono::Duration::hours(72) {
        5
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqc_core::types::TenantId;
    use cqc_store::types::TransactionType;

    fn base_lead() -> Lead {
        Lead::new(TenantId::default(), "chat:1")
    }

    #[test]
    fn fully_qualified_recent_lead_scores_high() {
        let mut lead = base_lead();
        lead.phone = Some("+971501234567".into());
        lead.budget_min = Some(100_000);
        lead.budget_max = Some(200_000);
        lead.transaction_type = Some(TransactionType::Buy);
        lead.property_type = Some(cqc_store::types::PropertyType::Apartment);
        lead.preferred_locations.insert("Dubai Marina".into());
        lead.payment_method = Some("cash".into());
        lead.messages_count = 20;
        lead.qr_scan_count = 10;
        lead.catalog_views = 10;
        lead.voice_messages_count = 1;
        recompute(&mut lead);
        assert_eq!(lead.lead_score, 100);
        assert_eq!(lead.temperature, Temperature::Burning);
    }

    #[test]
    fn fresh_lead_scores_zero() {
        let mut lead = base_lead();
        lead.last_interaction = Utc::now() - chrono::Duration::hours(100);
        recompute(&mut lead);
        assert_eq!(lead.lead_score, 0);
        assert_eq!(lead.temperature, Temperature::Cold);
    }

    #[test]
    fn engagement_caps_at_forty() {
        let mut lead = base_lead();
        lead.qr_scan_count = 100;
        lead.catalog_views = 100;
        lead.messages_count = 100;
        lead.voice_messages_count = 1;
        recompute(&mut lead);
        // engagement alone caps at 40; recency is near-full (20) since fresh.
        assert_eq!(lead.lead_score, 60);
    }
}
