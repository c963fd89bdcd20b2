use cqc_core::types::BotResponse;
use cqc_store::types::{Lead, LeadState};

use crate::messages::text;

use super::buttons;

const MAX_SLOTS_OFFERED: usize = 4;

/// `HANDOFF_SCHEDULE`: scheduling intent detected. Offers 3-4 available
/// slots (spec §4.1).
pub fn handle(ctx: &super::HandlerCtx, lead: &mut Lead) -> BotResponse {
    let slots = ctx.store.available_slots(&lead.tenant_id, MAX_SLOTS_OFFERED).unwrap_or_default();
    if slots.is_empty() {
        lead.state = LeadState::Engagement;
        return BotResponse::text("No viewing slots are open right now — I'll have someone reach out directly.");
    }

    let pairs: Vec<(String, String)> = slots
        .iter()
        .map(|s| {
            (
                format!("{} {}-{}", s.day_of_week, s.start_time, s.end_time),
                format!("slot_{}", s.id),
            )
        })
        .collect();
    let refs: Vec<(&str, &str)> = pairs.iter().map(|(l, p)| (l.as_str(), p.as_str())).collect();

    BotResponse::text(text(lead.language, "handoff_offer")).with_buttons(buttons(&refs))
}

/// Handles the slot-selection button, booking atomically (spec §4.1/§3 invariant 8).
pub fn handle_booking(ctx: &super::HandlerCtx, lead: &mut Lead, payload: &str) -> BotResponse {
    let Some(slot_id) = payload.strip_prefix("slot_") else {
        return handle(ctx, lead);
    };
    let slot_id = cqc_core::types::SlotId::from(slot_id);
    match ctx.store.book_slot(&lead.tenant_id, &slot_id, &lead.id) {
        Ok(_appointment) => {
            lead.state = LeadState::Completed;
            lead.status = cqc_store::types::LeadStatus::ViewingScheduled;
            BotResponse::text("You're booked! We'll see you then.")
        }
        Err(_) => {
            BotResponse::text("That slot was just taken — here are the remaining options.")
                .with_buttons(handle(ctx, lead).buttons.unwrap_or_default())
        }
    }
}
