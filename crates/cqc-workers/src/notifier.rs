use async_trait::async_trait;
use cqc_core::types::{AdminAlert, OutboundMessage};

/// Delivers worker-initiated sends to a lead's channel or a tenant's admin
/// channel, outside of any inbound turn. Implemented by whichever transport
/// crate owns the live connection (mirrors the `channel_senders` map a
/// gateway-style binary keeps for outbound pushes).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_to_lead(&self, message: OutboundMessage) -> Result<(), String>;
    async fn send_admin_alert(&self, alert: AdminAlert) -> Result<(), String>;
}
