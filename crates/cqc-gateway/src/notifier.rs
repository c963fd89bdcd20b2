//! `cqc_workers::Notifier` implementation for the gateway-style channel:
//! worker-initiated sends (Ghost Protocol, match notifier, daily digest) are
//! POSTed to the pre-hop gateway service's outbound endpoint, mirroring how
//! the inbound webhook arrives from it.

use async_trait::async_trait;
use serde_json::json;

use cqc_core::types::{AdminAlert, OutboundMessage};
use cqc_workers::Notifier;

pub struct GatewayNotifier {
    client: reqwest::Client,
    outbound_url: Option<String>,
}

impl GatewayNotifier {
    pub fn new(outbound_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            outbound_url,
        }
    }

    async fn post(&self, to: &str, text: &str) -> Result<(), String> {
        let url = self
            .outbound_url
            .as_deref()
            .ok_or_else(|| "no gateway_webhook.outbound_url configured".to_string())?;

        let resp = self
            .client
            .post(url)
            .json(&json!({"to": to, "text": text}))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !resp.status().is_success() {
            return Err(format!("gateway outbound send returned {}", resp.status()));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for GatewayNotifier {
    async fn send_to_lead(&self, message: OutboundMessage) -> Result<(), String> {
        self.post(&message.channel_identity, &message.text).await
    }

    async fn send_admin_alert(&self, alert: AdminAlert) -> Result<(), String> {
        self.post(&alert.chat_id, &alert.text).await
    }
}

/// Dispatches a worker-initiated send to whichever transport the identity
/// shape indicates, so a single `GhostWorker`/`MatchNotifier`/`DigestWorker`
/// can serve leads from both channels without knowing which one a lead came
/// through. WhatsApp-gateway identities are E.164 numbers (leading `+`);
/// Telegram identities are bare chat ids (`i64`, no `+`).
pub struct CompositeNotifier {
    telegram: Option<cqc_telegram::TelegramNotifier>,
    gateway: GatewayNotifier,
}

impl CompositeNotifier {
    pub fn new(telegram: Option<cqc_telegram::TelegramNotifier>, gateway: GatewayNotifier) -> Self {
        Self { telegram, gateway }
    }

    fn is_gateway_identity(identity: &str) -> bool {
        identity.starts_with('+')
    }
}

#[async_trait]
impl Notifier for CompositeNotifier {
    async fn send_to_lead(&self, message: OutboundMessage) -> Result<(), String> {
        if Self::is_gateway_identity(&message.channel_identity) {
            self.gateway.send_to_lead(message).await
        } else {
            match &self.telegram {
                Some(tg) => tg.send_to_lead(message).await,
                None => Err("no telegram transport configured for this identity".to_string()),
            }
        }
    }

    async fn send_admin_alert(&self, alert: AdminAlert) -> Result<(), String> {
        if Self::is_gateway_identity(&alert.chat_id) {
            self.gateway.send_admin_alert(alert).await
        } else {
            match &self.telegram {
                Some(tg) => tg.send_admin_alert(alert).await,
                None => Err("no telegram transport configured for this identity".to_string()),
            }
        }
    }
}
