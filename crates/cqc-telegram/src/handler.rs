//! Telegram update handlers registered in the teloxide Dispatcher.
//!
//! Normalises every inbound update into a `cqc_core::types::Message`,
//! resolves a tenant via the Channel Router, and dispatches into the state
//! machine (spec §4.1/§4.2/§6).

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{
    ButtonRequest, CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton,
    KeyboardMarkup,
};
use tracing::warn;

use cqc_core::types::{BotResponse, Channel, ContactShare, Language, Message as CqcMessage};
use cqc_router::{ChannelRouter, RouteOutcome, RouterError};
use cqc_state::StateMachine;

use crate::adapter::TelegramContext;
use crate::send;
use crate::typing::TypingHandle;

const SET_ADMIN_COMMAND: &str = "/set_admin";

/// Main handler for inbound `Message` updates.
pub async fn handle_message(bot: Bot, msg: Message, ctx: Arc<TelegramContext>) -> ResponseResult<()> {
    if msg.from.as_ref().map(|u| u.is_bot).unwrap_or(false) {
        return Ok(());
    }

    let chat_id = msg.chat.id;
    let channel_identity = chat_id.0.to_string();
    let text = msg.text().or(msg.caption()).map(str::to_string);
    let contact = msg.contact().map(|c| ContactShare {
        name: Some(match &c.last_name {
            Some(last) => format!("{} {}", c.first_name, last),
            None => c.first_name.clone(),
        }),
        phone_number: c.phone_number.clone(),
    });
    let has_voice = msg.voice().is_some();
    let has_media = msg.photo().is_some()
        || msg.document().is_some()
        || msg.video().is_some()
        || msg.audio().is_some()
        || msg.sticker().is_some();

    if text.is_none() && contact.is_none() && !has_voice && !has_media {
        return Ok(());
    }

    if text.as_deref() == Some(SET_ADMIN_COMMAND) {
        handle_set_admin(&bot, &ctx, chat_id, &channel_identity).await;
        return Ok(());
    }

    let locale_hint = msg
        .from
        .as_ref()
        .and_then(|u| u.language_code.as_deref())
        .and_then(Language::from_code);

    let typing = TypingHandle::start(bot.clone(), chat_id);

    match route(&ctx, &channel_identity, text.as_deref().unwrap_or("")) {
        Ok(RouteOutcome::MenuFallback) => {
            typing.stop();
            send::send_response(&bot, chat_id, &cqc_state::messages::text(Language::En, "menu_fallback")).await;
        }
        Ok(RouteOutcome::Routed { tenant_id, .. }) => {
            let cqc_message = CqcMessage {
                tenant_hint: Some(tenant_id.clone()),
                channel: Channel::Telegram,
                channel_identity: channel_identity.clone(),
                text,
                button_payload: None,
                contact,
                has_voice,
                has_media,
                locale_hint,
            };
            let machine = StateMachine::new(&ctx.store, ctx.oracle.as_ref(), &ctx.locks);
            let result = machine.process(&tenant_id, &channel_identity, &cqc_message).await;
            typing.stop();
            deliver(&bot, chat_id, result).await;
        }
        Err(e) => {
            typing.stop();
            warn!(error = %e, "telegram: channel router failed");
        }
    }

    Ok(())
}

/// Handler for inline-keyboard button presses.
pub async fn handle_callback_query(bot: Bot, q: CallbackQuery, ctx: Arc<TelegramContext>) -> ResponseResult<()> {
    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;
    let channel_identity = chat_id.0.to_string();
    let payload = q.data.clone().unwrap_or_default();

    match route(&ctx, &channel_identity, "") {
        // A button press on a chat with no established route has nothing to
        // act on — there is no menu to fall back to without inbound text.
        Ok(RouteOutcome::MenuFallback) => {}
        Ok(RouteOutcome::Routed { tenant_id, .. }) => {
            let cqc_message = CqcMessage {
                tenant_hint: Some(tenant_id.clone()),
                channel: Channel::Telegram,
                channel_identity: channel_identity.clone(),
                text: None,
                button_payload: Some(payload),
                contact: None,
                has_voice: false,
                has_media: false,
                locale_hint: None,
            };
            let machine = StateMachine::new(&ctx.store, ctx.oracle.as_ref(), &ctx.locks);
            let result = machine.process(&tenant_id, &channel_identity, &cqc_message).await;
            deliver(&bot, chat_id, result).await;
        }
        Err(e) => warn!(error = %e, "telegram: channel router failed"),
    }

    Ok(())
}

fn route(
    ctx: &TelegramContext,
    channel_identity: &str,
    text: &str,
) -> Result<RouteOutcome, RouterError> {
    ChannelRouter::new(&ctx.store, &ctx.sessions).resolve(channel_identity, text)
}

/// `/set_admin` binds the sending chat as the tenant's admin alert
/// destination (spec §6). Only valid once the chat has already been routed
/// to a tenant by a deep-link or prior session memory.
async fn handle_set_admin(bot: &Bot, ctx: &TelegramContext, chat_id: ChatId, channel_identity: &str) {
    match route(ctx, channel_identity, SET_ADMIN_COMMAND) {
        Ok(RouteOutcome::Routed { tenant_id, .. }) => {
            match ctx.store.set_admin_channel_identity(&tenant_id, channel_identity) {
                Ok(()) => {
                    send::send_response(bot, chat_id, "This chat is now the admin channel for alerts.").await;
                }
                Err(e) => warn!(error = %e, "telegram: failed to set admin channel identity"),
            }
        }
        _ => {
            send::send_response(
                bot,
                chat_id,
                "No tenant is routed to this chat yet — open the agent's link first.",
            )
            .await;
        }
    }
}

/// Renders a state-machine turn's `BotResponse` to Telegram: text (with
/// inline-keyboard buttons if present), a contact-request keyboard if asked
/// for, and a side-channel admin alert if the turn raised one.
async fn deliver(bot: &Bot, chat_id: ChatId, result: cqc_core::Result<BotResponse>) {
    let response = match result {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "telegram: state machine turn failed");
            send::send_response(bot, chat_id, "Something went wrong on our end — please try again in a moment.").await;
            return;
        }
    };

    if let Some(alert) = &response.admin_alert {
        if let Ok(admin_chat_id) = alert.chat_id.parse::<i64>() {
            send::send_response(bot, ChatId(admin_chat_id), &alert.text).await;
        } else {
            warn!(chat_id = %alert.chat_id, "telegram: admin alert chat id is not numeric");
        }
    }

    if let Some(buttons) = &response.buttons {
        let keyboard = InlineKeyboardMarkup::new(
            buttons
                .iter()
                .map(|b| vec![InlineKeyboardButton::callback(b.label.clone(), b.payload.clone())]),
        );
        if let Err(e) = bot.send_message(chat_id, &response.text).reply_markup(keyboard).await {
            warn!(error = %e, "telegram: failed to send button message, falling back to plain text");
            send::send_response(bot, chat_id, &response.text).await;
        }
    } else {
        send::send_response(bot, chat_id, &response.text).await;
    }

    if response.request_contact {
        let keyboard = KeyboardMarkup::new(vec![vec![
            KeyboardButton::new("Share phone number").request(ButtonRequest::Contact),
        ]])
        .resize_keyboard();
        if let Err(e) = bot
            .send_message(chat_id, "Tap below to share your number.")
            .reply_markup(keyboard)
            .await
        {
            warn!(error = %e, "telegram: failed to send contact-request keyboard");
        }
    }
}
