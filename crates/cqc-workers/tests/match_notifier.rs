use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use cqc_core::types::{AdminAlert, Language, OutboundMessage, PropertyId, TenantId};
use cqc_store::events::PropertyInserted;
use cqc_store::types::{LeadStatus, Property, PropertyCategory, PropertyType, Tenant};
use cqc_store::Store;
use cqc_workers::{MatchNotifier, Notifier};

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
        admin_channel_identity: None,
        subscription_active: true,
        verticals: vec!["realty".into()],
    }
}

fn property(id: PropertyId, tenant_id: TenantId, price: i64) -> Property {
    Property {
        id,
        tenant_id,
        title: "Marina Tower Unit".into(),
        price,
        bedrooms: 2,
        location: "Dubai Marina".into(),
        property_type: PropertyType::Apartment,
        property_category: PropertyCategory::Residential,
        is_featured: false,
        is_available: true,
        is_off_plan: false,
        is_urgent: false,
        golden_visa_eligible: false,
        expected_roi: None,
        media_refs: vec![],
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn qualified_lead_within_flexed_budget_gets_notified_once() {
    let store = Store::in_memory().unwrap();
    let tenant_id = TenantId::new();
    store.create_tenant(&tenant(tenant_id.clone())).unwrap();

    let mut lead = store.get_or_create_lead(&tenant_id, "chat-1").unwrap();
    lead.status = LeadStatus::Qualified;
    lead.budget_min = Some(1_000_000);
    lead.budget_max = Some(1_500_000);
    store.save_lead(&lead).unwrap();

    // 1,600,000 is within 10% flex of 1,500,000 (max 1,650,000).
    let prop = property(PropertyId::new(), tenant_id.clone(), 1_600_000);
    store.insert_property(&prop).unwrap();

    let notifier = RecordingNotifier::new();
    let worker = MatchNotifier::new(&store, &notifier);
    let event = PropertyInserted { tenant_id: tenant_id.clone(), property_id: prop.id.clone() };

    worker.handle_insert(&event).await.unwrap();
    assert_eq!(notifier.sent.lock().unwrap().len(), 1);

    // Re-processing the same insert must not double-notify.
    worker.handle_insert(&event).await.unwrap();
    assert_eq!(notifier.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn lead_outside_flexed_budget_is_not_notified() {
    let store = Store::in_memory().unwrap();
    let tenant_id = TenantId::new();
    store.create_tenant(&tenant(tenant_id.clone())).unwrap();

    let mut lead = store.get_or_create_lead(&tenant_id, "chat-1").unwrap();
    lead.status = LeadStatus::Qualified;
    lead.budget_min = Some(1_000_000);
    lead.budget_max = Some(1_500_000);
    store.save_lead(&lead).unwrap();

    // 2,000,000 exceeds the 10% flex ceiling of 1,650,000.
    let prop = property(PropertyId::new(), tenant_id.clone(), 2_000_000);
    store.insert_property(&prop).unwrap();

    let notifier = RecordingNotifier::new();
    let worker = MatchNotifier::new(&store, &notifier);
    let event = PropertyInserted { tenant_id: tenant_id.clone(), property_id: prop.id.clone() };

    worker.handle_insert(&event).await.unwrap();
    assert!(notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn new_lead_status_is_never_a_match_candidate() {
    let store = Store::in_memory().unwrap();
    let tenant_id = TenantId::new();
    store.create_tenant(&tenant(tenant_id.clone())).unwrap();

    let mut lead = store.get_or_create_lead(&tenant_id, "chat-1").unwrap();
    lead.budget_min = Some(0);
    lead.budget_max = Some(10_000_000);
    store.save_lead(&lead).unwrap();

    let prop = property(PropertyId::new(), tenant_id.clone(), 1_000_000);
    store.insert_property(&prop).unwrap();

    let notifier = RecordingNotifier::new();
    let worker = MatchNotifier::new(&store, &notifier);
    let event = PropertyInserted { tenant_id: tenant_id.clone(), property_id: prop.id.clone() };

    worker.handle_insert(&event).await.unwrap();
    assert!(notifier.sent.lock().unwrap().is_empty());
}

