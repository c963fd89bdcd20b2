use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use cqc_core::types::{AdminAlert, Language, OutboundMessage, TenantId};
use cqc_store::types::{LeadState, Tenant};
use cqc_store::Store;
use cqc_workers::{GhostWorker, Notifier};

struct RecordingNotifier {
    sent: Mutex<Vec<OutboundMessage>>,
}

impl RecordingNotifier {
    fn new() -> Self {
        Self { sent: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_to_lead(&self, message: OutboundMessage) -> Result<(), String> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }

    async fn send_admin_alert(&self, _alert: AdminAlert) -> Result<(), String> {
        Ok(())
    }
}

fn tenant(id: TenantId) -> Tenant {
    Tenant {
        id,
        name: "Test Agency".into(),
        default_language: Language::En,
        branding_colour: None,
        admin_channel_identity: Some("admin-chat".into()),
        subscription_active: true,
        verticals: vec!["realty".into()],
    }
}

#[tokio::test]
async fn idle_lead_past_two_hours_gets_exactly_one_follow_up() {
    let store = Store::in_memory().unwrap();
    let tenant_id = TenantId::new();
    store.create_tenant(&tenant(tenant_id.clone())).unwrap();

    let mut lead = store.get_or_create_lead(&tenant_id, "chat-1").unwrap();
    lead.phone = Some("+971501234567".into());
    lead.state = LeadState::ValueProposition;
    lead.last_interaction = Utc::now() - Duration::hours(2) - Duration::minutes(1);
    store.save_lead(&lead).unwrap();

    let notifier = RecordingNotifier::new();
    let worker = GhostWorker::new(&store, &notifier, std::time::Duration::from_secs(1));

    worker.tick().await.unwrap();
    assert_eq!(notifier.sent.lock().unwrap().len(), 1);

    let refreshed = store
        .get_lead_by_channel_identity(&tenant_id, "chat-1")
        .unwrap()
        .unwrap();
    assert!(refreshed.ghost_reminder_sent);
    assert_eq!(refreshed.fomo_messages_sent, 1);

    worker.tick().await.unwrap();
    assert_eq!(notifier.sent.lock().unwrap().len(), 1, "second tick must not re-send");
}

#[tokio::test]
async fn lead_just_under_the_cutoff_is_left_alone() {
    let store = Store::in_memory().unwrap();
    let tenant_id = TenantId::new();
    store.create_tenant(&tenant(tenant_id.clone())).unwrap();

    let created = store.get_or_create_lead(&tenant_id, "chat-2").unwrap();
    let mut lead = created;
    lead.phone = Some("+971501234567".into());
    lead.state = LeadState::ValueProposition;
    lead.last_interaction = Utc::now() - Duration::hours(1) - Duration::minutes(59);
    store.save_lead(&lead).unwrap();

    let notifier = RecordingNotifier::new();
    let worker = GhostWorker::new(&store, &notifier, std::time::Duration::from_secs(1));
    worker.tick().await.unwrap();

    assert!(notifier.sent.lock().unwrap().is_empty());
}
