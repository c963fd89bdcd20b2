use cqc_core::types::{BotResponse, Message};
use cqc_oracle::{AiOracle, OracleRequest};
use cqc_store::types::{Lead, LeadState, PropertyCategory};

use crate::messages::text;

use super::HandlerCtx;

/// `ENGAGEMENT`: qualified and contacted. Free conversation routed through
/// the AI Oracle with inventory/knowledge context (spec §4.1). Contact is
/// already captured by the time a lead reaches this state (spec invariant
/// 4), so a document request can be served immediately.
pub async fn handle(ctx: &HandlerCtx<'_>, lead: &mut Lead, message: &Message) -> BotResponse {
    if message.button_payload.as_deref() == Some("request_viewing") {
        lead.state = LeadState::HandoffSchedule;
        return super::handoff_schedule::handle(ctx, lead);
    }
    if message.button_payload.as_deref() == Some("request_document") {
        return request_document(ctx, lead);
    }

    let Some(text_input) = message.text.as_deref() else {
        return BotResponse::text(text(lead.language, "engagement_open"));
    };

    let snippets = cqc_knowledge::retrieve(ctx.store, &lead.tenant_id, lead.language, text_input, cqc_knowledge::DEFAULT_TOP_K)
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.entry.content)
        .collect::<Vec<_>>();

    let request = OracleRequest {
        utterance: text_input.to_string(),
        lang_hint: Some(lead.language),
        slot_schema: vec![],
        knowledge_snippets: snippets,
    };

    match ctx.oracle.extract(&request).await {
        Ok(extraction) => {
            if let Some(lang) = extraction.lang {
                if lang != lead.language {
                    lead.language = lang;
                }
            }
            match extraction.free_text_answer {
                Some(answer) => BotResponse::text(answer),
                None => BotResponse::text(text(lead.language, "engagement_open")),
            }
        }
        Err(_) => BotResponse::text(text(lead.language, "faq_fallback")),
    }
}

/// Attaches the brochure/media reference for the lead's best current match,
/// if the tenant's inventory has one. Phone is already on file by this
/// point, so no gate is needed before handing it over.
fn request_document(ctx: &HandlerCtx, lead: &Lead) -> BotResponse {
    let category = lead.property_category.unwrap_or(PropertyCategory::Residential);
    let budget_min = lead.budget_min.unwrap_or(0);
    let budget_max = lead.budget_max.unwrap_or(i64::MAX);
    let matched_ref = ctx
        .store
        .list_available_properties(&lead.tenant_id, category, lead.property_type.as_ref(), budget_min, budget_max)
        .unwrap_or_default()
        .into_iter()
        .find_map(|p| p.media_refs.into_iter().next());

    match matched_ref {
        Some(media_ref) => BotResponse::text(text(lead.language, "document_sent")).with_document_ref(media_ref),
        None => BotResponse::text(text(lead.language, "document_unavailable")),
    }
}
