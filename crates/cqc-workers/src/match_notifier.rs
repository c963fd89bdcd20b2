use cqc_core::types::OutboundMessage;
use cqc_store::types::{Lead, Property};
use cqc_store::Store;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

use crate::error::Result;
use crate::notifier::Notifier;

/// New-property match notifier (spec §4.8): wakes on every `PropertyInserted`
/// event and pings qualified/hot leads of the same tenant whose stated
/// preferences the new listing satisfies. Deduplicated per (lead, property)
/// via the store's notification table so re-delivery on a re-tick is a no-op.
pub struct MatchNotifier<'a> {
    store: &'a Store,
    notifier: &'a dyn Notifier,
}

impl<'a> MatchNotifier<'a> {
    pub fn new(store: &'a Store, notifier: &'a dyn Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("match notifier worker started");
        let mut events = self.store.events.subscribe();
        loop {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Ok(event) => {
                            if let Err(e) = self.handle_insert(&event).await {
                                error!(property_id = %event.property_id, "match notifier tick failed: {e}");
                            }
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "match notifier fell behind the property insert stream");
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("match notifier worker shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// Runs the match sweep for a single inserted property. `run` drives
    /// this from the event stream; exposed directly so tests can trigger it
    /// without going through the broadcast channel.
    #[instrument(skip(self, event), fields(property_id = %event.property_id))]
    pub async fn handle_insert(&self, event: &cqc_store::events::PropertyInserted) -> Result<()> {
        let property = self.store.get_property(&event.property_id)?;
        let candidates = self.store.match_candidates(&event.tenant_id)?;

        for lead in candidates {
            if !matches(&lead, &property) {
                continue;
            }
            if self.store.already_notified(&lead.id, &property.id)? {
                continue;
            }

            let annotation = cqc_state::scarcity::annotate(&property);
            let text = format!(
                "New match: {} — AED {} — {}\n{}\n{}",
                property.title, property.price, property.location,
                annotation.scarcity_line, annotation.social_proof_line,
            );
            if let Err(e) = self
                .notifier
                .send_to_lead(OutboundMessage {
                    tenant_id: lead.tenant_id.clone(),
                    channel_identity: lead.channel_identity.clone(),
                    text,
                })
                .await
            {
                warn!(lead_id = %lead.id, "match notification send failed, skipping: {e}");
                continue;
            }
            self.store.mark_notified(&lead.id, &property.id)?;
        }
        Ok(())
    }
}

/// Spec §4.8's match predicate. A document/ROI attachment is out of scope
/// (PDF generation is a named non-goal).
fn matches(lead: &Lead, property: &Property) -> bool {
    let budget_min = lead.budget_min.unwrap_or(0);
    let budget_max = lead.budget_max.unwrap_or(i64::MAX);
    let flexed_max = if budget_max == i64::MAX {
        i64::MAX
    } else {
        budget_max.saturating_add(budget_max / 10)
    };
    if property.price < budget_min || property.price > flexed_max {
        return false;
    }

    if let (Some(min), Some(max)) = (lead.bedrooms_min, lead.bedrooms_max) {
        if property.bedrooms < min || property.bedrooms > max {
            return false;
        }
    }

    if !lead.preferred_locations.is_empty() {
        let location = property.location.to_lowercase();
        let any_match = lead
            .preferred_locations
            .iter()
            .any(|loc| location.contains(&loc.to_lowercase()));
        if !any_match {
            return false;
        }
    }

    if let Some(property_type) = &lead.property_type {
        if property_type != &property.property_type {
            return false;
        }
    }

    true
}
