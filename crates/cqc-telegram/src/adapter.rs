//! Telegram channel adapter.
//!
//! Wraps a teloxide `Bot` + `Dispatcher` and drives the long-polling event loop
//! until the process exits. Reconnects automatically on transport errors.

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::info;

use cqc_core::config::TelegramConfig;
use cqc_oracle::AiOracle;
use cqc_sessions::SessionCache;
use cqc_state::LeadLockManager;
use cqc_store::Store;

use crate::handler::{handle_callback_query, handle_message};

/// Everything a turn needs to resolve a tenant, run the state machine, and
/// persist the result. Constructed once by the composition root (the
/// gateway binary) and shared across every inbound update.
pub struct TelegramContext {
    pub store: Store,
    pub sessions: SessionCache,
    pub oracle: Box<dyn AiOracle>,
    pub locks: LeadLockManager,
}

/// Telegram channel adapter.
///
/// Wraps a teloxide `Bot` and drives the Dispatcher event loop until the
/// process exits. Long polling — no public URL required.
pub struct TelegramAdapter {
    ctx: Arc<TelegramContext>,
    config: TelegramConfig,
}

impl TelegramAdapter {
    pub fn new(config: &TelegramConfig, ctx: Arc<TelegramContext>) -> Self {
        Self {
            ctx,
            config: config.clone(),
        }
    }

    /// Connect to Telegram and drive the long-polling loop.
    ///
    /// Never returns — runs for the lifetime of the process.
    pub async fn run(self) {
        let bot = Bot::new(&self.config.bot_token);

        info!("Telegram: starting long-polling dispatcher");

        let ctx = Arc::clone(&self.ctx);

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(handle_message))
            .branch(Update::filter_callback_query().endpoint(handle_callback_query));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![ctx])
            .default_handler(|_upd| async {})
            .build()
            .dispatch()
            .await;
    }
}
