use cqc_core::types::BotResponse;
use cqc_store::types::{Goal, Lead, LeadState};

use crate::messages::text;

use super::buttons;
use super::start::language_from_payload;

/// `LANGUAGE_SELECTED`: language known, no goal. Presents three goal
/// buttons plus the rent affordance (spec §4.1).
pub fn handle(lead: &mut Lead, button_payload: Option<&str>) -> BotResponse {
    let Some(payload) = button_payload else {
        return prompt(lead);
    };

    if let Some(language) = language_from_payload(payload) {
        lead.language = language;
        return prompt(lead);
    }

    let Some(goal) = goal_from_payload(payload) else {
        return prompt(lead);
    };

    lead.goal = Some(goal);
    lead.transaction_type = Some(goal.implied_transaction_type());
    lead.fill_slot("goal");
    lead.state = LeadState::Warmup;
    super::warmup::handle(lead)
}

fn prompt(lead: &Lead) -> BotResponse {
    BotResponse::text(text(lead.language, "ask_goal")).with_buttons(buttons(&[
        ("Investment", "goal_investment"),
        ("Living", "goal_living"),
        ("Residency (Golden Visa)", "goal_residency"),
        ("Rent", "goal_rent"),
    ]))
}

fn goal_from_payload(payload: &str) -> Option<Goal> {
    match payload {
        "goal_investment" => Some(Goal::Investment),
        "goal_living" => Some(Goal::Living),
        "goal_residency" => Some(Goal::Residency),
        "goal_rent" => Some(Goal::Rent),
        _ => None,
    }
}
