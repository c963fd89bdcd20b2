use cqc_core::types::BotResponse;
use cqc_store::types::Lead;

use crate::messages::text;

/// `COMPLETED`: terminal. No automated messages beyond an acknowledgement;
/// workers may still re-engage (spec §4.1).
pub fn handle(lead: &Lead) -> BotResponse {
    BotResponse::text(text(lead.language, "completed"))
}
