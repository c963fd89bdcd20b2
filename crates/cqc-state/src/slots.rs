use cqc_store::types::Lead;

/// Order in which `SLOT_FILLING` asks for missing slots: most-informative
/// first (spec §4.1: "ask the single most-informative pending slot").
/// `property_category` gates `property_type` and must come before it;
/// `budget` is independent but asked early since it prunes inventory hardest.
pub const SLOT_PRIORITY: [&str; 3] = ["property_category", "budget", "property_type"];

pub fn next_pending_slot(lead: &Lead) -> Option<&'static str> {
    SLOT_PRIORITY.into_iter().find(|slot| !is_filled(lead, slot))
}

pub fn is_filled(lead: &Lead, slot: &str) -> bool {
    match slot {
        "property_category" => lead.property_category.is_some(),
        "budget" => lead.budget_min.is_some() && lead.budget_max.is_some(),
        "property_type" => lead.property_type.is_some(),
        "transaction_type" => lead.transaction_type.is_some(),
        other => lead.filled_slots.contains(other),
    }
}

/// All qualifying slots for `VALUE_PROPOSITION` (spec invariant 4).
pub fn qualifying_slots_filled(lead: &Lead) -> bool {
    lead.goal.is_some()
        && lead.transaction_type.is_some()
        && lead.property_category.is_some()
        && lead.budget_min.is_some()
        && lead.budget_max.is_some()
}
