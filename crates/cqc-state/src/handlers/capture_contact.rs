use chrono::Local;
use cqc_core::types::{AdminAlert, BotResponse, Message};
use cqc_store::types::{Lead, LeadState};

use crate::contact::{parse_contact_line, validate_phone};
use crate::messages::text;
use crate::slots;

use super::HandlerCtx;

/// `CAPTURE_CONTACT`: awaiting phone/name. Validates on receipt; on first-time
/// phone population, emits a Hot-Lead alert to the tenant's admin (spec §4.9).
pub fn handle(ctx: &HandlerCtx, lead: &mut Lead, message: &Message) -> BotResponse {
    let candidate = message
        .contact
        .as_ref()
        .and_then(|c| validate_phone(&c.phone_number).map(|p| (c.name.clone(), p)))
        .or_else(|| {
            message
                .text
                .as_deref()
                .and_then(parse_contact_line)
        });

    let Some((name, phone)) = candidate else {
        return BotResponse::text(text(lead.language, "invalid_phone")).with_request_contact();
    };

    let is_first_population = lead.phone.is_none();
    lead.phone = Some(phone.as_str().to_string());
    if name.is_some() {
        lead.name = name;
    }
    lead.fill_slot("phone");

    let mut response = advance(ctx, lead);

    if is_first_population {
        if let Some(alert) = hot_lead_alert(ctx, lead) {
            response.admin_alert = Some(alert);
        }
    }
    response
}

fn advance(ctx: &HandlerCtx, lead: &mut Lead) -> BotResponse {
    match slots::next_pending_slot(lead) {
        Some(slot) => {
            lead.state = LeadState::SlotFilling;
            lead.pending_slot = Some(slot.to_string());
            super::slot_filling::prompt_for(lead, slot)
        }
        None => {
            lead.state = LeadState::ValueProposition;
            super::value_proposition::handle(ctx, lead)
        }
    }
}

fn hot_lead_alert(ctx: &HandlerCtx, lead: &Lead) -> Option<AdminAlert> {
    let tenant = ctx.store.get_tenant(&lead.tenant_id).ok()?;
    let Some(chat_id) = tenant.admin_channel_identity else {
        tracing::warn!(tenant_id = %lead.tenant_id, "admin channel not configured, skipping hot-lead alert");
        return None;
    };
    let now = Local::now().format("%Y-%m-%d %H:%M").to_string();
    let goal = lead.goal.map(|g| g.to_string()).unwrap_or_else(|| "unknown".into());
    let name = lead.name.clone().unwrap_or_else(|| "(no name)".into());
    let phone = lead.phone.clone().unwrap_or_default();
    Some(AdminAlert {
        chat_id,
        text: format!("Hot lead! {name} — {phone} — goal: {goal} — {now}"),
    })
}
