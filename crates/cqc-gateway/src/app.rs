use cqc_core::config::GatewayWebhookConfig;
use cqc_oracle::AiOracle;
use cqc_router::ChannelRouter;
use cqc_sessions::SessionCache;
use cqc_state::{LeadLockManager, StateMachine};
use cqc_store::Store;

/// Central shared state for the gateway-style (WhatsApp) webhook and health
/// endpoints — passed as `Arc<AppState>` to every Axum handler.
pub struct AppState {
    pub store: Store,
    pub sessions: SessionCache,
    pub oracle: Box<dyn AiOracle>,
    pub locks: LeadLockManager,
    pub webhook: GatewayWebhookConfig,
}

impl AppState {
    pub fn machine(&self) -> StateMachine<'_> {
        StateMachine::new(&self.store, self.oracle.as_ref(), &self.locks)
    }

    pub fn router(&self) -> ChannelRouter<'_> {
        ChannelRouter::new(&self.store, &self.sessions)
    }
}
