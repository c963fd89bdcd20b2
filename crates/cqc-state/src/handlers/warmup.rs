use cqc_core::types::BotResponse;
use cqc_store::types::{Lead, LeadState};

use crate::messages::text;

/// `WARMUP`: goal just captured. This state has no turn of its own — its
/// only outbound contract is asking for contact, after which the machine is
/// already waiting in `CAPTURE_CONTACT` for the reply (spec §4.1).
pub fn handle(lead: &mut Lead) -> BotResponse {
    lead.state = LeadState::CaptureContact;
    BotResponse::text(text(lead.language, "ask_contact")).with_request_contact()
}
