use cqc_core::types::BotResponse;
use cqc_store::types::{Lead, LeadState};

use crate::scarcity::{self, HOT_MARKET_MESSAGE};

use super::HandlerCtx;

const MAX_PROPERTIES_SHOWN: usize = 5;

/// `VALUE_PROPOSITION`: all qualifying slots filled (spec invariant 4).
/// Presents up to 5 matched properties with scarcity annotation and one
/// educational snippet, or a "hot market" filler if nothing matched.
pub fn handle(ctx: &HandlerCtx, lead: &mut Lead) -> BotResponse {
    // Guaranteed non-empty by `assert_state_integrity` before this handler runs.
    let category = lead.property_category.unwrap_or(cqc_store::types::PropertyCategory::Residential);
    let property_type = lead.property_type.clone();
    let budget_min = lead.budget_min.unwrap_or(0);
    let budget_max = lead.budget_max.unwrap_or(i64::MAX);
    let matches = ctx
        .store
        .list_available_properties(
            &lead.tenant_id,
            category,
            property_type.as_ref(),
            budget_min,
            budget_max,
        )
        .unwrap_or_default();

    let response = if matches.is_empty() {
        lead.urgency_score = (lead.urgency_score + 2).min(10);
        BotResponse::text(HOT_MARKET_MESSAGE)
    } else {
        let mut lines = Vec::new();
        for property in matches.iter().take(MAX_PROPERTIES_SHOWN) {
            let annotation = scarcity::annotate(property);
            let mut block = format!(
                "{} — AED {} — {}\n{}\n{}",
                property.title, property.price, property.location,
                annotation.scarcity_line, annotation.social_proof_line,
            );
            if let Some(pressure) = annotation.time_pressure_line {
                block.push('\n');
                block.push_str(&pressure);
            }
            lines.push(block);
        }
        if let Some(goal) = lead.goal {
            if let Ok(Some(snippet)) =
                cqc_knowledge::education_snippet(ctx.store, &lead.tenant_id, lead.language, "roi golden visa", goal)
            {
                lines.push(snippet.content);
            }
        }
        lead.fomo_messages_sent += 1;
        lead.urgency_score = (lead.urgency_score + 1).min(10);
        BotResponse::text(lines.join("\n\n"))
    };

    lead.state = LeadState::Engagement;
    response
}
