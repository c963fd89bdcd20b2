use async_trait::async_trait;
use cqc_core::types::{Channel, ContactShare, Language, Message, TenantId};
use cqc_oracle::{AiOracle, OracleError, OracleExtraction, OracleRequest};
use cqc_state::{LeadLockManager, StateMachine};
use cqc_store::types::{LeadState, Property, PropertyCategory, PropertyType, Tenant};
use cqc_store::Store;

/// An oracle that never extracts anything and answers with a canned
/// free-text response, standing in for the AI Oracle in scenarios that need
/// one but don't exercise a real HTTP provider.
struct ScriptedOracle {
    free_text_answer: Option<String>,
}

#[async_trait]
impl AiOracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn extract(&self, _req: &OracleRequest) -> Result<OracleExtraction, OracleError> {
        Ok(OracleExtraction {
            lang: None,
            slots_filled: Default::default(),
            free_text_answer: self.free_text_answer.clone(),
            confidence: 1.0,
        })
    }
}

fn tenant(id: TenantId, admin: Option<&str>) -> Tenant {
    Tenant {
        id,
        name: "Test Agency".into(),
        default_language: Language::En,
        branding_colour: None,
        admin_channel_identity: admin.map(String::from),
        subscription_active: true,
        verticals: vec!["realty".into()],
    }
}

fn property(tenant_id: TenantId, title: &str, price: i64, category: PropertyCategory, kind: PropertyType) -> Property {
    Property {
        id: cqc_core::types::PropertyId::new(),
        tenant_id,
        title: title.into(),
        price,
        bedrooms: 2,
        location: "Dubai".into(),
        property_type: kind,
        property_category: category,
        is_featured: false,
        is_available: true,
        is_off_plan: false,
        is_urgent: false,
        golden_visa_eligible: true,
        expected_roi: Some(8.5),
        media_refs: vec![],
        created_at: chrono::Utc::now(),
    }
}

fn button(payload: &str) -> Message {
    Message {
        tenant_hint: None,
        channel: Channel::Telegram,
        channel_identity: "900".into(),
        text: None,
        button_payload: Some(payload.into()),
        contact: None,
        has_voice: false,
        has_media: false,
        locale_hint: None,
    }
}

#[tokio::test]
async fn investment_flow_ends_qualified_with_a_single_hot_lead_alert() {
    let store = Store::in_memory().unwrap();
    let tenant_id = TenantId::new();
    store.create_tenant(&tenant(tenant_id.clone(), Some("admin-chat"))).unwrap();
    store
        .insert_property(&property(
            tenant_id.clone(),
            "Marina Tower Unit",
            420_000,
            PropertyCategory::Residential,
            PropertyType::Apartment,
        ))
        .unwrap();

    let oracle = ScriptedOracle { free_text_answer: None };
    let locks = LeadLockManager::new();
    let machine = StateMachine::new(&store, &oracle, &locks);

    let start = Message {
        tenant_hint: None,
        channel: Channel::Telegram,
        channel_identity: "900".into(),
        text: Some("/start".into()),
        button_payload: None,
        contact: None,
        has_voice: false,
        has_media: false,
        locale_hint: None,
    };
    machine.process(&tenant_id, "900", &start).await.unwrap();

    machine.process(&tenant_id, "900", &button("lang_fa")).await.unwrap();
    let after_language = store.get_lead_by_channel_identity(&tenant_id, "900").unwrap().unwrap();
    assert_eq!(after_language.language, Language::Fa, "tapping lang_fa must set the lead's language");

    machine.process(&tenant_id, "900", &button("goal_investment")).await.unwrap();

    let contact_msg = Message {
        tenant_hint: None,
        channel: Channel::Telegram,
        channel_identity: "900".into(),
        text: None,
        button_payload: None,
        contact: Some(ContactShare { name: Some("Sam".into()), phone_number: "+971501234567".into() }),
        has_voice: false,
        has_media: false,
        locale_hint: None,
    };
    let after_contact = machine.process(&tenant_id, "900", &contact_msg).await.unwrap();
    let alert = after_contact.admin_alert.expect("first phone capture must raise a hot-lead alert");
    assert_eq!(alert.chat_id, "admin-chat");
    assert!(alert.text.contains("+971501234567"));
    assert!(alert.text.contains("investment"));

    machine.process(&tenant_id, "900", &button("category_residential")).await.unwrap();
    machine.process(&tenant_id, "900", &button("budget_2")).await.unwrap();
    let final_response = machine.process(&tenant_id, "900", &button("prop_apartment")).await.unwrap();

    assert!(final_response.text.contains("Marina Tower Unit"));

    let lead = store.get_lead_by_channel_identity(&tenant_id, "900").unwrap().unwrap();
    assert_eq!(lead.state, LeadState::Engagement);
    assert_eq!(lead.budget_min, Some(300_000));
    assert_eq!(lead.budget_max, Some(500_000));

    // Replaying a later turn must not raise a second alert for the same
    // phone — only the null -> set transition does (spec invariant).
    let followup = machine.process(&tenant_id, "900", &button("prop_apartment")).await.unwrap();
    assert!(followup.admin_alert.is_none());
}

#[tokio::test]
async fn faq_during_slot_filling_answers_then_reasks_same_slot() {
    let store = Store::in_memory().unwrap();
    let tenant_id = TenantId::new();
    store.create_tenant(&tenant(tenant_id.clone(), None)).unwrap();

    let mut lead = store.get_or_create_lead(&tenant_id, "901").unwrap();
    lead.language = Language::En;
    lead.goal = Some(cqc_store::types::Goal::Investment);
    lead.transaction_type = Some(cqc_store::types::TransactionType::Buy);
    lead.state = LeadState::SlotFilling;
    lead.pending_slot = Some("budget".into());
    store.save_lead(&lead).unwrap();

    let oracle = ScriptedOracle {
        free_text_answer: Some("Yes — funds are held in an RERA-regulated escrow account.".into()),
    };
    let locks = LeadLockManager::new();
    let machine = StateMachine::new(&store, &oracle, &locks);

    let faq = Message {
        tenant_hint: None,
        channel: Channel::Telegram,
        channel_identity: "901".into(),
        text: Some("Is my money safe?".into()),
        button_payload: None,
        contact: None,
        has_voice: false,
        has_media: false,
        locale_hint: None,
    };
    let response = machine.process(&tenant_id, "901", &faq).await.unwrap();

    assert!(response.text.contains("escrow"));
    assert!(response.text.contains("budget range"));

    let refreshed = store.get_lead_by_channel_identity(&tenant_id, "901").unwrap().unwrap();
    assert_eq!(refreshed.state, LeadState::SlotFilling);
    assert_eq!(refreshed.pending_slot.as_deref(), Some("budget"));
}

#[tokio::test]
async fn budget_with_no_transaction_type_is_recovered_not_defaulted() {
    let store = Store::in_memory().unwrap();
    let tenant_id = TenantId::new();
    store.create_tenant(&tenant(tenant_id.clone(), None)).unwrap();

    let mut lead = store.get_or_create_lead(&tenant_id, "902").unwrap();
    lead.state = LeadState::SlotFilling;
    lead.pending_slot = Some("budget".into());
    lead.transaction_type = None;
    store.save_lead(&lead).unwrap();

    let oracle = ScriptedOracle { free_text_answer: None };
    let locks = LeadLockManager::new();
    let machine = StateMachine::new(&store, &oracle, &locks);

    let response = machine.process(&tenant_id, "902", &button("budget_2")).await.unwrap();

    assert_eq!(response.text, "Are you looking to buy or rent?");
    assert!(response.buttons.is_none());

    let refreshed = store.get_lead_by_channel_identity(&tenant_id, "902").unwrap().unwrap();
    assert_eq!(refreshed.pending_slot.as_deref(), Some("transaction_type"));
    assert!(refreshed.budget_min.is_none(), "no silent default budget must be written");
}

#[tokio::test]
async fn filled_slots_never_shrinks_across_turns_until_reset() {
    let store = Store::in_memory().unwrap();
    let tenant_id = TenantId::new();
    store.create_tenant(&tenant(tenant_id.clone(), None)).unwrap();

    let oracle = ScriptedOracle { free_text_answer: None };
    let locks = LeadLockManager::new();
    let machine = StateMachine::new(&store, &oracle, &locks);

    let start = Message {
        tenant_hint: None,
        channel: Channel::Telegram,
        channel_identity: "903".into(),
        text: Some("/start".into()),
        button_payload: None,
        contact: None,
        has_voice: false,
        has_media: false,
        locale_hint: None,
    };
    machine.process(&tenant_id, "903", &start).await.unwrap();
    machine.process(&tenant_id, "903", &button("lang_en")).await.unwrap();

    let mut previous_len = 0;
    for payload in ["goal_rent"] {
        machine.process(&tenant_id, "903", &button(payload)).await.unwrap();
        let lead = store.get_lead_by_channel_identity(&tenant_id, "903").unwrap().unwrap();
        assert!(lead.filled_slots.len() >= previous_len);
        previous_len = lead.filled_slots.len();
    }

    // A reset via `/start` is the only sanctioned shrink.
    machine.process(&tenant_id, "903", &start).await.unwrap();
    let reset_lead = store.get_lead_by_channel_identity(&tenant_id, "903").unwrap().unwrap();
    assert!(reset_lead.filled_slots.is_empty());
}

#[tokio::test]
async fn request_document_in_engagement_attaches_a_media_ref_without_a_phone_gate() {
    let store = Store::in_memory().unwrap();
    let tenant_id = TenantId::new();
    store.create_tenant(&tenant(tenant_id.clone(), None)).unwrap();
    let mut listed = property(
        tenant_id.clone(),
        "Downtown Loft",
        610_000,
        PropertyCategory::Residential,
        PropertyType::Apartment,
    );
    listed.media_refs = vec!["https://cdn.example/brochures/downtown-loft.pdf".into()];
    store.insert_property(&listed).unwrap();

    let mut lead = store.get_or_create_lead(&tenant_id, "904").unwrap();
    lead.phone = Some("+971501234567".into());
    lead.property_category = Some(PropertyCategory::Residential);
    lead.budget_min = Some(500_000);
    lead.budget_max = Some(700_000);
    lead.state = LeadState::Engagement;
    store.save_lead(&lead).unwrap();

    let oracle = ScriptedOracle { free_text_answer: None };
    let locks = LeadLockManager::new();
    let machine = StateMachine::new(&store, &oracle, &locks);

    let response = machine.process(&tenant_id, "904", &button("request_document")).await.unwrap();
    assert_eq!(response.document_ref.as_deref(), Some("https://cdn.example/brochures/downtown-loft.pdf"));
}
