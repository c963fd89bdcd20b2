//! `cqc_workers::Notifier` implementation that delivers worker-initiated
//! sends (Ghost Protocol follow-ups, match-notifier pings, the daily digest)
//! to live Telegram chats, outside of any inbound turn.

use async_trait::async_trait;
use teloxide::prelude::*;

use cqc_core::types::{AdminAlert, OutboundMessage};
use cqc_workers::Notifier;

use crate::send;

pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_to_lead(&self, message: OutboundMessage) -> Result<(), String> {
        let chat_id: i64 = message
            .channel_identity
            .parse()
            .map_err(|_| format!("invalid Telegram chat id: {}", message.channel_identity))?;
        send::send_response(&self.bot, ChatId(chat_id), &message.text).await;
        Ok(())
    }

    async fn send_admin_alert(&self, alert: AdminAlert) -> Result<(), String> {
        let chat_id: i64 = alert
            .chat_id
            .parse()
            .map_err(|_| format!("invalid Telegram chat id: {}", alert.chat_id))?;
        send::send_response(&self.bot, ChatId(chat_id), &alert.text).await;
        Ok(())
    }
}
