use std::time::Duration;

use cqc_core::types::OutboundMessage;
use cqc_store::Store;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

use crate::error::Result;
use crate::notifier::Notifier;

/// Backoff applied after a tick fails outright, so a crash loop doesn't spin
/// hot against a store that's still unavailable (spec §4.7).
const CRASH_BACKOFF: Duration = Duration::from_secs(5 * 60);

/// Per-tenant 2-hour inactivity follow-up (spec §4.7). Wakes on a fixed
/// interval and selects leads idle past the cutoff with no reminder sent
/// yet; per-lead failures are isolated so one bad row never aborts the
/// batch, mirroring the tick-loop shape of the teacher's scheduler engine.
pub struct GhostWorker<'a> {
    store: &'a Store,
    notifier: &'a dyn Notifier,
    tick_interval: Duration,
}

impl<'a> GhostWorker<'a> {
    pub fn new(store: &'a Store, notifier: &'a dyn Notifier, tick_interval: Duration) -> Self {
        Self { store, notifier, tick_interval }
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("ghost protocol worker started");
        let mut interval = tokio::time::interval(self.tick_interval);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.tick().await {
                        error!("ghost protocol tick failed, backing off: {e}");
                        tokio::time::sleep(CRASH_BACKOFF).await;
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("ghost protocol worker shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// One sweep over every active tenant's ghost candidates. `run` loops
    /// this on an interval; exposed directly so tests can assert a single
    /// tick's effect without driving the full select loop.
    #[instrument(skip(self))]
    pub async fn tick(&self) -> Result<()> {
        let now = chrono::Utc::now();
        for tenant in self.store.list_active_tenants()? {
            let candidates = match self.store.ghost_candidates(&tenant.id, now) {
                Ok(leads) => leads,
                Err(e) => {
                    warn!(tenant_id = %tenant.id, "ghost_candidates query failed: {e}");
                    continue;
                }
            };
            for mut lead in candidates {
                let text = cqc_state::messages::text(lead.language, "ghost_followup");
                if let Err(e) = self
                    .notifier
                    .send_to_lead(OutboundMessage {
                        tenant_id: lead.tenant_id.clone(),
                        channel_identity: lead.channel_identity.clone(),
                        text,
                    })
                    .await
                {
                    warn!(lead_id = %lead.id, "ghost follow-up send failed, skipping: {e}");
                    continue;
                }

                lead.ghost_reminder_sent = true;
                lead.fomo_messages_sent += 1;
                lead.last_interaction = now;
                if let Err(e) = self.store.save_lead(&lead) {
                    warn!(lead_id = %lead.id, "failed to persist ghost reminder state: {e}");
                }
            }
        }
        Ok(())
    }
}
