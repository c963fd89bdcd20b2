use std::collections::HashMap;
use std::time::Duration;

use chrono::{NaiveDate, Timelike, Utc};
use cqc_core::types::{AdminAlert, TenantId};
use cqc_store::types::{LeadStatus, Temperature};
use cqc_store::Store;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::notifier::Notifier;

const POLL_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Daily tenant summary (SPEC_FULL.md §4.7/§4.8 supplement — not in the
/// distilled spec's §4.7/§4.8 detail, only named in the component table).
/// Once per tenant per UTC day, at the configured hour, aggregates the last
/// 24h of lead activity by status and temperature and reuses the Hot-Lead
/// admin-alert egress path to deliver it.
pub struct DigestWorker<'a> {
    store: &'a Store,
    notifier: &'a dyn Notifier,
    digest_hour_utc: u32,
    last_sent: HashMap<TenantId, NaiveDate>,
}

impl<'a> DigestWorker<'a> {
    pub fn new(store: &'a Store, notifier: &'a dyn Notifier, digest_hour_utc: u32) -> Self {
        Self { store, notifier, digest_hour_utc, last_sent: HashMap::new() }
    }

    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("digest worker started");
        let mut interval = tokio::time::interval(POLL_INTERVAL);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.tick().await {
                        warn!("digest tick failed: {e}");
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("digest worker shutting down");
                        break;
                    }
                }
            }
        }
    }

    #[instrument(skip(self))]
    async fn tick(&mut self) -> Result<()> {
        let now = Utc::now();
        if now.hour() != self.digest_hour_utc {
            return Ok(());
        }
        let today = now.date_naive();

        for tenant in self.store.list_active_tenants()? {
            if self.last_sent.get(&tenant.id) == Some(&today) {
                continue;
            }

            let Some(admin_channel) = tenant.admin_channel_identity.clone() else {
                warn!(tenant_id = %tenant.id, "admin channel not configured, skipping daily digest");
                self.last_sent.insert(tenant.id.clone(), today);
                continue;
            };

            let since = now - chrono::Duration::hours(24);
            let leads = self.store.leads_for_tenant_since(&tenant.id, since)?;
            let summary = summarize(&leads);

            if let Err(e) = self
                .notifier
                .send_admin_alert(AdminAlert { chat_id: admin_channel, text: summary })
                .await
            {
                warn!(tenant_id = %tenant.id, "daily digest send failed: {e}");
                continue;
            }
            self.last_sent.insert(tenant.id.clone(), today);
        }
        Ok(())
    }
}

fn summarize(leads: &[cqc_store::types::Lead]) -> String {
    let mut by_status: HashMap<LeadStatus, u32> = HashMap::new();
    let mut by_temperature: HashMap<Temperature, u32> = HashMap::new();
    for lead in leads {
        *by_status.entry(lead.status).or_insert(0) += 1;
        *by_temperature.entry(lead.temperature).or_insert(0) += 1;
    }

    let statuses = [
        LeadStatus::New,
        LeadStatus::Qualified,
        LeadStatus::Hot,
        LeadStatus::ViewingScheduled,
        LeadStatus::ClosedWon,
        LeadStatus::ClosedLost,
    ];
    let temperatures = [Temperature::Cold, Temperature::Warm, Temperature::Hot, Temperature::Burning];

    let status_line = statuses
        .iter()
        .map(|s| format!("{s}: {}", by_status.get(s).copied().unwrap_or(0)))
        .collect::<Vec<_>>()
        .join(", ");
    let temperature_line = temperatures
        .iter()
        .map(|t| format!("{t}: {}", by_temperature.get(t).copied().unwrap_or(0)))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Daily digest — {} leads in the last 24h\nBy status: {status_line}\nBy temperature: {temperature_line}",
        leads.len(),
    )
}
