use cqc_core::types::{BotResponse, Message};
use cqc_oracle::AiOracle;
use cqc_store::types::{Lead, LeadState};
use cqc_store::Store;
use tracing::{error, instrument};

use crate::handlers::{self, HandlerCtx};
use crate::lock::LeadLockManager;
use crate::scoring;

/// Central entry point: `process(lead, message, button?) -> BotResponse`
/// (spec §4.1). Acquires the per-lead lock, validates state integrity,
/// dispatches to the state's handler, recomputes score, and persists.
pub struct StateMachine<'a> {
    store: &'a Store,
    oracle: &'a dyn AiOracle,
    locks: &'a LeadLockManager,
}

impl<'a> StateMachine<'a> {
    pub fn new(store: &'a Store, oracle: &'a dyn AiOracle, locks: &'a LeadLockManager) -> Self {
        Self { store, oracle, locks }
    }

    #[instrument(skip(self, message), fields(tenant_id = %tenant_id, channel_identity = %channel_identity))]
    pub async fn process(
        &self,
        tenant_id: &cqc_core::types::TenantId,
        channel_identity: &str,
        message: &Message,
    ) -> cqc_core::Result<BotResponse> {
        let handle = self.locks.acquire(tenant_id.as_str(), channel_identity).await;
        let _guard = handle.lock().await;

        let mut lead = self
            .store
            .get_or_create_lead(tenant_id, channel_identity)
            .map_err(cqc_core::CqcError::from)?;

        lead.messages_count += 1;
        if message.has_voice {
            lead.voice_messages_count += 1;
        }
        lead.last_interaction = chrono::Utc::now();

        if message.text.as_deref() == Some("/start") {
            lead = Lead::new(lead.tenant_id.clone(), lead.channel_identity.clone());
            let response = handlers::start::handle(&mut lead);
            self.persist(lead)?;
            return Ok(response);
        }

        if let Some(recovery) = assert_state_integrity(&mut lead) {
            error!(lead_id = %lead.id, state = %lead.state, "state integrity violation, re-asking upstream slot");
            self.persist(lead)?;
            return Ok(recovery);
        }

        let ctx = HandlerCtx { store: self.store, oracle: self.oracle };
        let response = self.dispatch(&ctx, &mut lead, message).await;

        scoring::recompute(&mut lead);
        lead.updated_at = chrono::Utc::now();
        self.persist(lead)?;
        Ok(response)
    }

    async fn dispatch(&self, ctx: &HandlerCtx<'_>, lead: &mut Lead, message: &Message) -> BotResponse {
        match lead.state {
            LeadState::Start => handlers::start::handle(lead),
            LeadState::LanguageSelected => {
                handlers::language_selected::handle(lead, message.button_payload.as_deref())
            }
            LeadState::Warmup => handlers::warmup::handle(lead),
            LeadState::CaptureContact => handlers::capture_contact::handle(ctx, lead, message),
            LeadState::SlotFilling => handlers::slot_filling::handle(ctx, lead, message).await,
            LeadState::ValueProposition => handlers::value_proposition::handle(ctx, lead),
            LeadState::Engagement => handlers::engagement::handle(ctx, lead, message).await,
            LeadState::HandoffSchedule => match message.button_payload.as_deref() {
                Some(payload) if payload.starts_with("slot_") => {
                    handlers::handoff_schedule::handle_booking(ctx, lead, payload)
                }
                _ => handlers::handoff_schedule::handle(ctx, lead),
            },
            LeadState::Completed => handlers::completed::handle(lead),
        }
    }

    fn persist(&self, lead: Lead) -> cqc_core::Result<()> {
        self.store.save_lead(&lead).map_err(cqc_core::CqcError::from)
    }
}

/// Validates that no pending ask violates an upstream dependency (spec §4.1
/// "Budget/category flow integrity"). Returns `Some(recovery response)` if a
/// violation is found, re-asking the missing upstream slot instead of
/// fabricating a default.
fn assert_state_integrity(lead: &mut Lead) -> Option<BotResponse> {
    match lead.pending_slot.as_deref() {
        Some("budget") if lead.transaction_type.is_none() => {
            lead.pending_slot = Some("transaction_type".to_string());
            Some(handlers::slot_filling::prompt_for(lead, "transaction_type"))
        }
        Some("property_type") if lead.property_category.is_none() => {
            lead.pending_slot = Some("property_category".to_string());
            Some(handlers::slot_filling::prompt_for(lead, "property_category"))
        }
        _ => None,
    }
}
