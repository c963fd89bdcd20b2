use std::str::FromStr;

use cqc_core::types::{BotResponse, Message};
use cqc_oracle::{OracleRequest, AiOracle};
use cqc_store::types::{Lead, LeadState, PropertyCategory, PropertyType};

use crate::budget::{band_by_index, bands_for};
use crate::messages::text;
use crate::slots;

use super::{buttons, HandlerCtx};

/// `SLOT_FILLING`: at least one of {category, budget, property_type} missing.
/// Handles button answers synchronously, free text via the deterministic
/// parser first and the AI Oracle as a fallback (spec §4.1).
pub async fn handle(ctx: &HandlerCtx<'_>, lead: &mut Lead, message: &Message) -> BotResponse {
    let pending = lead.pending_slot.clone().unwrap_or_else(|| {
        slots::next_pending_slot(lead).unwrap_or("property_category").to_string()
    });

    if message.has_voice || message.has_media {
        if let Some(payload) = &message.button_payload {
            if fill_from_button(lead, &pending, payload) {
                return advance_or_reprompt(ctx, lead);
            }
        }
        return zombie_ack(ctx, lead, &pending);
    }

    if let Some(payload) = &message.button_payload {
        if fill_from_button(lead, &pending, payload) {
            return advance_or_reprompt(ctx, lead);
        }
        return prompt_for(lead, &pending);
    }

    let Some(text_input) = message.text.as_deref() else {
        return prompt_for(lead, &pending);
    };

    if pending == "budget" {
        if let Some(amount) = crate::budget::parse_amount(text_input) {
            if fill_budget_amount(lead, amount) {
                return advance_or_reprompt(ctx, lead);
            }
        }
    }

    let slot_schema = slots::SLOT_PRIORITY.to_vec();
    let snippets = cqc_knowledge::retrieve(ctx.store, &lead.tenant_id, lead.language, text_input, cqc_knowledge::DEFAULT_TOP_K)
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.entry.content)
        .collect::<Vec<_>>();

    let request = OracleRequest {
        utterance: text_input.to_string(),
        lang_hint: Some(lead.language),
        slot_schema: slot_schema.iter().map(|s| s.to_string()).collect(),
        knowledge_snippets: snippets,
    };

    match ctx.oracle.extract(&request).await {
        Ok(extraction) => {
            if let Some(lang) = extraction.lang {
                if lang != lead.language {
                    lead.language = lang;
                }
            }
            if let Some(value) = extraction.slots_filled.get(pending.as_str()) {
                if fill_from_text_value(lead, &pending, value) {
                    return advance_or_reprompt(ctx, lead);
                }
            }
            if let Some(answer) = extraction.free_text_answer {
                let ask_again = prompt_for(lead, &pending);
                return BotResponse::text(format!("{answer}\n\n{}", ask_again.text))
                    .with_buttons(ask_again.buttons.unwrap_or_default());
            }
            prompt_for(lead, &pending)
        }
        Err(_) => prompt_for(lead, &pending),
    }
}

fn zombie_ack(ctx: &HandlerCtx, lead: &Lead, pending: &str) -> BotResponse {
    let reprompt = prompt_for(lead, pending);
    BotResponse::text(format!("{}\n\n{}", text(lead.language, "zombie_ack"), reprompt.text))
        .with_buttons(reprompt.buttons.unwrap_or_default())
}

fn advance_or_reprompt(ctx: &HandlerCtx, lead: &mut Lead) -> BotResponse {
    match slots::next_pending_slot(lead) {
        Some(next) => {
            lead.pending_slot = Some(next.to_string());
            prompt_for(lead, next)
        }
        None => {
            lead.pending_slot = None;
            lead.state = LeadState::ValueProposition;
            super::value_proposition::handle(ctx, lead)
        }
    }
}

fn fill_from_button(lead: &mut Lead, pending: &str, payload: &str) -> bool {
    match pending {
        "property_category" => {
            let category = match payload {
                "category_residential" => Some(PropertyCategory::Residential),
                "category_commercial" => Some(PropertyCategory::Commercial),
                _ => None,
            };
            if let Some(c) = category {
                lead.property_category = Some(c);
                lead.fill_slot("property_category");
                return true;
            }
            false
        }
        "budget" => {
            let Some(index_str) = payload.strip_prefix("budget_") else { return false };
            let Ok(index) = index_str.parse::<u8>() else { return false };
            let Some(transaction_type) = lead.transaction_type else { return false };
            let Some(band) = band_by_index(transaction_type, index) else { return false };
            lead.budget_min = Some(band.min);
            lead.budget_max = Some(band.max.unwrap_or(i64::MAX));
            lead.fill_slot("budget");
            true
        }
        "property_type" => {
            let Some(kind) = payload.strip_prefix("prop_") else { return false };
            lead.property_type = Some(PropertyType::from_str(kind).unwrap());
            lead.fill_slot("property_type");
            true
        }
        _ => false,
    }
}

fn fill_budget_amount(lead: &mut Lead, amount: i64) -> bool {
    let Some(transaction_type) = lead.transaction_type else { return false };
    let band = bands_for(transaction_type)
        .iter()
        .find(|b| amount >= b.min && b.max.map(|max| amount <= max).unwrap_or(true));
    let Some(band) = band else { return false };
    lead.budget_min = Some(band.min);
    lead.budget_max = Some(band.max.unwrap_or(i64::MAX));
    lead.fill_slot("budget");
    true
}

fn fill_from_text_value(lead: &mut Lead, pending: &str, value: &str) -> bool {
    match pending {
        "property_category" => {
            if let Ok(category) = PropertyCategory::from_str(value) {
                lead.property_category = Some(category);
                lead.fill_slot("property_category");
                return true;
            }
            false
        }
        "budget" => value.parse::<i64>().ok().map(|amount| fill_budget_amount(lead, amount)).unwrap_or(false),
        "property_type" => {
            lead.property_type = Some(PropertyType::from_str(value).unwrap());
            lead.fill_slot("property_type");
            true
        }
        _ => false,
    }
}

/// Render the prompt+buttons for a given pending slot. Also used by
/// `capture_contact` when first transitioning into `SLOT_FILLING`, and by
/// the zombie/FAQ re-ask paths, so the prompt is always identical to what a
/// fresh entry into the slot would show (spec §4.1: "re-ask the pending slot
/// with buttons intact").
pub fn prompt_for(lead: &Lead, slot: &str) -> BotResponse {
    match slot {
        "property_category" => BotResponse::text(text(lead.language, "ask_category")).with_buttons(buttons(&[
            ("Residential", "category_residential"),
            ("Commercial", "category_commercial"),
        ])),
        "budget" => {
            let transaction_type = lead.transaction_type.unwrap_or(cqc_store::types::TransactionType::Buy);
            let band_buttons: Vec<(String, String)> = bands_for(transaction_type)
                .iter()
                .map(|b| {
                    let label = match b.max {
                        Some(max) => format!("{} - {}", b.min, max),
                        None => format!("{}+", b.min),
                    };
                    (label, format!("budget_{}", b.index))
                })
                .collect();
            let refs: Vec<(&str, &str)> = band_buttons.iter().map(|(l, p)| (l.as_str(), p.as_str())).collect();
            BotResponse::text(text(lead.language, "ask_budget")).with_buttons(buttons(&refs))
        }
        "property_type" => BotResponse::text(text(lead.language, "ask_property_type")).with_buttons(buttons(&[
            ("Apartment", "prop_apartment"),
            ("Villa", "prop_villa"),
            ("Townhouse", "prop_townhouse"),
            ("Penthouse", "prop_penthouse"),
            ("Office", "prop_office"),
            ("Shop", "prop_shop"),
        ])),
        _ => BotResponse::text(text(lead.language, "ask_transaction_type")),
    }
}
