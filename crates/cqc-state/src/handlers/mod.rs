pub mod capture_contact;
pub mod completed;
pub mod engagement;
pub mod handoff_schedule;
pub mod language_selected;
pub mod slot_filling;
pub mod start;
pub mod value_proposition;
pub mod warmup;

use cqc_core::types::Button;
use cqc_oracle::AiOracle;
use cqc_store::Store;

/// Shared capabilities handed to every state handler. Handlers take the
/// store as a capability rather than owning entity graphs (spec §9).
pub struct HandlerCtx<'a> {
    pub store: &'a Store,
    pub oracle: &'a dyn AiOracle,
}

pub(crate) fn buttons(pairs: &[(&str, &str)]) -> Vec<Button> {
    pairs
        .iter()
        .map(|(label, payload)| Button {
            label: label.to_string(),
            payload: payload.to_string(),
        })
        .collect()
}
