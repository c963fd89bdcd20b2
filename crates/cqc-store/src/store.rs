//! The Entity Store: durable tenant/lead/property/knowledge/schedule/appointment
//! records with tenant-scoped queries. One connection per process, the same
//! shape as `skynet_sessions::manager::SessionManager`.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use cqc_core::types::{
    AppointmentId, KnowledgeId, Language, LeadId, PropertyId, SlotId, TenantId,
};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::instrument;

use crate::error::{Result, StoreError};
use crate::events::{EventBus, PropertyInserted};
use crate::types::{
    Appointment, AppointmentStatus, Goal, Knowledge, Lead, LeadState, LeadStatus, Property,
    PropertyCategory, PropertyType, ScheduleSlot, Temperature, Tenant, TransactionType,
};

pub struct Store {
    conn: Mutex<Connection>,
    pub events: EventBus,
}

impl Store {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        crate::db::init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            events: EventBus::new(),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        crate::db::init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            events: EventBus::new(),
        })
    }

    // ---- Tenants ---------------------------------------------------------

    #[instrument(skip(self))]
    pub fn create_tenant(&self, tenant: &Tenant) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO tenants (id, name, default_language, branding_colour,
                admin_channel_identity, subscription_active, verticals)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                tenant.id.as_str(),
                tenant.name,
                tenant.default_language.code(),
                tenant.branding_colour,
                tenant.admin_channel_identity,
                tenant.subscription_active as i32,
                serde_json::to_string(&tenant.verticals).unwrap(),
            ],
        )?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn get_tenant(&self, tenant_id: &TenantId) -> Result<Tenant> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, name, default_language, branding_colour, admin_channel_identity,
                    subscription_active, verticals
             FROM tenants WHERE id = ?1",
            params![tenant_id.as_str()],
            row_to_tenant,
        )
        .optional()?
        .ok_or_else(|| StoreError::NotFound("tenant", tenant_id.to_string()))
    }

    /// Resolve a deep-link substring keyword/vertical to a tenant. Tenants
    /// self-describe their recognised verticals (spec §4.2/§6).
    #[instrument(skip(self))]
    pub fn find_tenant_by_vertical(&self, vertical: &str) -> Result<Option<Tenant>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, default_language, branding_colour, admin_channel_identity,
                    subscription_active, verticals
             FROM tenants",
        )?;
        let tenants = stmt
            .query_map([], row_to_tenant)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tenants
            .into_iter()
            .find(|t| t.verticals.iter().any(|v| v == vertical)))
    }

    /// All tenants with an active subscription, for the per-tenant worker
    /// ticks (Ghost Protocol, digest) to iterate over.
    #[instrument(skip(self))]
    pub fn list_active_tenants(&self) -> Result<Vec<Tenant>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, default_language, branding_colour, admin_channel_identity,
                    subscription_active, verticals
             FROM tenants WHERE subscription_active = 1",
        )?;
        let tenants = stmt
            .query_map([], row_to_tenant)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tenants)
    }

    #[instrument(skip(self))]
    pub fn set_admin_channel_identity(&self, tenant_id: &TenantId, identity: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE tenants SET admin_channel_identity = ?1 WHERE id = ?2",
            params![identity, tenant_id.as_str()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound("tenant", tenant_id.to_string()));
        }
        Ok(())
    }

    // ---- Leads -------------------------------------------------------------

    #[instrument(skip(self))]
    pub fn get_lead_by_channel_identity(
        &self,
        tenant_id: &TenantId,
        channel_identity: &str,
    ) -> Result<Option<Lead>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!("{LEAD_SELECT_SQL} WHERE tenant_id = ?1 AND channel_identity = ?2"),
            params![tenant_id.as_str(), channel_identity],
            row_to_lead,
        )
        .optional()
        .map_err(StoreError::from)
    }

    #[instrument(skip(self))]
    pub fn get_lead(&self, lead_id: &LeadId) -> Result<Lead> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!("{LEAD_SELECT_SQL} WHERE id = ?1"),
            params![lead_id.as_str()],
            row_to_lead,
        )
        .optional()?
        .ok_or_else(|| StoreError::NotFound("lead", lead_id.to_string()))
    }

    /// Per spec invariant 2, `(tenant_id, channel_identity)` uniquely
    /// identifies a lead; insert-or-fetch mirrors
    /// `SessionManager::get_or_create`.
    #[instrument(skip(self))]
    pub fn get_or_create_lead(&self, tenant_id: &TenantId, channel_identity: &str) -> Result<Lead> {
        if let Some(lead) = self.get_lead_by_channel_identity(tenant_id, channel_identity)? {
            return Ok(lead);
        }
        let lead = Lead::new(tenant_id.clone(), channel_identity);
        self.insert_lead(&lead)?;
        Ok(lead)
    }

    fn insert_lead(&self, lead: &Lead) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO leads (
                id, tenant_id, channel_identity, name, phone, language, goal,
                transaction_type, property_category, property_type, budget_min,
                budget_max, bedrooms_min, bedrooms_max, preferred_locations,
                payment_method, purpose, state, pending_slot, filled_slots,
                conversation_data, last_interaction, ghost_reminder_sent,
                fomo_messages_sent, urgency_score, messages_count,
                voice_messages_count, qr_scan_count, catalog_views, lead_score,
                temperature, status, created_at, updated_at
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,
                      ?19,?20,?21,?22,?23,?24,?25,?26,?27,?28,?29,?30,?31,?32,?33,?34)",
            rusqlite::params_from_iter(lead_params(lead)),
        )?;
        Ok(())
    }

    /// Full row replace on save; the state machine mutates an in-memory
    /// `Lead` and persists the whole row per turn, same as a normal
    /// read-modify-write under the per-lead lock (spec §5).
    #[instrument(skip(self, lead), fields(lead_id = %lead.id, state = %lead.state))]
    pub fn save_lead(&self, lead: &Lead) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE leads SET
                name=?2, phone=?3, language=?4, goal=?5, transaction_type=?6,
                property_category=?7, property_type=?8, budget_min=?9, budget_max=?10,
                bedrooms_min=?11, bedrooms_max=?12, preferred_locations=?13,
                payment_method=?14, purpose=?15, state=?16, pending_slot=?17,
                filled_slots=?18, conversation_data=?19, last_interaction=?20,
                ghost_reminder_sent=?21, fomo_messages_sent=?22, urgency_score=?23,
                messages_count=?24, voice_messages_count=?25, qr_scan_count=?26,
                catalog_views=?27, lead_score=?28, temperature=?29, status=?30,
                updated_at=?31
             WHERE id=?1",
            params![
                lead.id.as_str(),
                lead.name,
                lead.phone,
                lead.language.code(),
                lead.goal.map(|g| g.to_string()),
                lead.transaction_type.map(|t| t.to_string()),
                lead.property_category.map(|c| c.to_string()),
                lead.property_type.as_ref().map(|t| t.to_string()),
                lead.budget_min,
                lead.budget_max,
                lead.bedrooms_min,
                lead.bedrooms_max,
                serde_json::to_string(&lead.preferred_locations).unwrap(),
                lead.payment_method,
                lead.purpose,
                lead.state.to_string(),
                lead.pending_slot,
                serde_json::to_string(&lead.filled_slots).unwrap(),
                lead.conversation_data.to_string(),
                lead.last_interaction.to_rfc3339(),
                lead.ghost_reminder_sent as i32,
                lead.fomo_messages_sent,
                lead.urgency_score,
                lead.messages_count,
                lead.voice_messages_count,
                lead.qr_scan_count,
                lead.catalog_views,
                lead.lead_score,
                lead.temperature.to_string(),
                lead.status.to_string(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound("lead", lead.id.to_string()));
        }
        Ok(())
    }

    /// Candidates for the Ghost Protocol worker tick (spec §4.7).
    #[instrument(skip(self))]
    pub fn ghost_candidates(&self, tenant_id: &TenantId, now: DateTime<Utc>) -> Result<Vec<Lead>> {
        let cutoff = now - chrono::Duration::hours(2);
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "{LEAD_SELECT_SQL} WHERE tenant_id = ?1 AND phone IS NOT NULL
             AND state NOT IN ('handoff_schedule', 'completed')
             AND ghost_reminder_sent = 0 AND last_interaction <= ?2"
        ))?;
        let leads = stmt
            .query_map(
                params![tenant_id.as_str(), cutoff.to_rfc3339()],
                row_to_lead,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(leads)
    }

    /// Candidates for the new-property match notifier (spec §4.8).
    #[instrument(skip(self))]
    pub fn match_candidates(&self, tenant_id: &TenantId) -> Result<Vec<Lead>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "{LEAD_SELECT_SQL} WHERE tenant_id = ?1 AND status IN ('qualified', 'hot')"
        ))?;
        let leads = stmt
            .query_map(params![tenant_id.as_str()], row_to_lead)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(leads)
    }

    #[instrument(skip(self))]
    pub fn leads_for_tenant_since(
        &self,
        tenant_id: &TenantId,
        since: DateTime<Utc>,
    ) -> Result<Vec<Lead>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "{LEAD_SELECT_SQL} WHERE tenant_id = ?1 AND updated_at >= ?2"
        ))?;
        let leads = stmt
            .query_map(params![tenant_id.as_str(), since.to_rfc3339()], row_to_lead)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(leads)
    }

    // ---- Properties ----------------------------------------------------

    #[instrument(skip(self, property), fields(property_id = %property.id))]
    pub fn insert_property(&self, property: &Property) -> Result<()> {
        {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO properties (
                    id, tenant_id, title, price, bedrooms, location, property_type,
                    property_category, is_featured, is_available, is_off_plan,
                    is_urgent, golden_visa_eligible, expected_roi, media_refs, created_at
                ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16)",
                params![
                    property.id.as_str(),
                    property.tenant_id.as_str(),
                    property.title,
                    property.price,
                    property.bedrooms,
                    property.location,
                    property.property_type.to_string(),
                    property.property_category.to_string(),
                    property.is_featured as i32,
                    property.is_available as i32,
                    property.is_off_plan as i32,
                    property.is_urgent as i32,
                    property.golden_visa_eligible as i32,
                    property.expected_roi,
                    serde_json::to_string(&property.media_refs).unwrap(),
                    property.created_at.to_rfc3339(),
                ],
            )?;
        }
        self.events.publish(PropertyInserted {
            tenant_id: property.tenant_id.clone(),
            property_id: property.id.clone(),
        });
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn get_property(&self, property_id: &PropertyId) -> Result<Property> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!("{PROPERTY_SELECT_SQL} WHERE id = ?1"),
            params![property_id.as_str()],
            row_to_property,
        )
        .optional()?
        .ok_or_else(|| StoreError::NotFound("property", property_id.to_string()))
    }

    #[instrument(skip(self))]
    pub fn list_available_properties(
        &self,
        tenant_id: &TenantId,
        category: PropertyCategory,
        property_type: Option<&PropertyType>,
        budget_min: i64,
        budget_max: i64,
    ) -> Result<Vec<Property>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "{PROPERTY_SELECT_SQL} WHERE tenant_id = ?1 AND is_available = 1
             AND property_category = ?2 AND price BETWEEN ?3 AND ?4"
        ))?;
        let rows = stmt
            .query_map(
                params![
                    tenant_id.as_str(),
                    category.to_string(),
                    budget_min,
                    budget_max
                ],
                row_to_property,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows
            .into_iter()
            .filter(|p| match property_type {
                Some(pt) => &p.property_type == pt,
                None => true,
            })
            .collect())
    }

    // ---- Knowledge -------------------------------------------------------

    #[instrument(skip(self))]
    pub fn active_knowledge(&self, tenant_id: &TenantId, language: Language) -> Result<Vec<Knowledge>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, tenant_id, category, title, content, language, keywords, priority, is_active
             FROM knowledge WHERE tenant_id = ?1 AND language = ?2 AND is_active = 1",
        )?;
        let rows = stmt
            .query_map(params![tenant_id.as_str(), language.code()], row_to_knowledge)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    #[instrument(skip(self, knowledge))]
    pub fn insert_knowledge(&self, knowledge: &Knowledge) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO knowledge (id, tenant_id, category, title, content, language, keywords, priority, is_active)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
            params![
                knowledge.id.as_str(),
                knowledge.tenant_id.as_str(),
                knowledge.category,
                knowledge.title,
                knowledge.content,
                knowledge.language.code(),
                serde_json::to_string(&knowledge.keywords).unwrap(),
                knowledge.priority,
                knowledge.is_active as i32,
            ],
        )?;
        Ok(())
    }

    // ---- Schedule slots & appointments ------------------------------------

    #[instrument(skip(self))]
    pub fn available_slots(&self, tenant_id: &TenantId, limit: usize) -> Result<Vec<ScheduleSlot>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, tenant_id, day_of_week, start_time, end_time, is_booked
             FROM schedule_slots WHERE tenant_id = ?1 AND is_booked = 0
             ORDER BY day_of_week, start_time LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![tenant_id.as_str(), limit as i64], row_to_slot)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    #[instrument(skip(self))]
    pub fn insert_slot(&self, slot: &ScheduleSlot) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO schedule_slots (id, tenant_id, day_of_week, start_time, end_time, is_booked)
             VALUES (?1,?2,?3,?4,?5,?6)",
            params![
                slot.id.as_str(),
                slot.tenant_id.as_str(),
                slot.day_of_week,
                slot.start_time,
                slot.end_time,
                slot.is_booked as i32,
            ],
        )?;
        Ok(())
    }

    /// Atomic false->true transition plus appointment creation (spec
    /// invariant 8): the conditional `UPDATE ... WHERE is_booked = 0` is the
    /// equivalent of `SELECT ... FOR UPDATE` that spec §5 calls for on
    /// SQLite, which has no row-level locking primitive of its own.
    #[instrument(skip(self))]
    pub fn book_slot(&self, tenant_id: &TenantId, slot_id: &SlotId, lead_id: &LeadId) -> Result<Appointment> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let booked = tx.execute(
            "UPDATE schedule_slots SET is_booked = 1 WHERE id = ?1 AND tenant_id = ?2 AND is_booked = 0",
            params![slot_id.as_str(), tenant_id.as_str()],
        )?;
        if booked == 0 {
            return Err(StoreError::Invariant(format!(
                "slot {slot_id} already booked or not found"
            )));
        }
        let appointment = Appointment {
            id: AppointmentId::new(),
            tenant_id: tenant_id.clone(),
            lead_id: lead_id.clone(),
            slot_id: slot_id.clone(),
            status: AppointmentStatus::Scheduled,
            created_at: Utc::now(),
        };
        tx.execute(
            "INSERT INTO appointments (id, tenant_id, lead_id, slot_id, status, created_at)
             VALUES (?1,?2,?3,?4,?5,?6)",
            params![
                appointment.id.as_str(),
                appointment.tenant_id.as_str(),
                appointment.lead_id.as_str(),
                appointment.slot_id.as_str(),
                appointment.status.to_string(),
                appointment.created_at.to_rfc3339(),
            ],
        )?;
        tx.commit()?;
        Ok(appointment)
    }

    // ---- Match-notifier dedup table ----------------------------------------

    #[instrument(skip(self))]
    pub fn already_notified(&self, lead_id: &LeadId, property_id: &PropertyId) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let exists: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM property_notifications WHERE lead_id = ?1 AND property_id = ?2",
                params![lead_id.as_str(), property_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(exists.is_some())
    }

    #[instrument(skip(self))]
    pub fn mark_notified(&self, lead_id: &LeadId, property_id: &PropertyId) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO property_notifications (lead_id, property_id, notified_at)
             VALUES (?1, ?2, ?3)",
            params![lead_id.as_str(), property_id.as_str(), Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

const LEAD_SELECT_SQL: &str = "SELECT id, tenant_id, channel_identity, name, phone, language, goal,
    transaction_type, property_category, property_type, budget_min, budget_max,
    bedrooms_min, bedrooms_max, preferred_locations, payment_method, purpose,
    state, pending_slot, filled_slots, conversation_data, last_interaction,
    ghost_reminder_sent, fomo_messages_sent, urgency_score, messages_count,
    voice_messages_count, qr_scan_count, catalog_views, lead_score, temperature,
    status, created_at, updated_at FROM leads";

const PROPERTY_SELECT_SQL: &str = "SELECT id, tenant_id, title, price, bedrooms, location,
    property_type, property_category, is_featured, is_available, is_off_plan,
    is_urgent, golden_visa_eligible, expected_roi, media_refs, created_at FROM properties";

fn lead_params(lead: &Lead) -> Vec<Box<dyn rusqlite::ToSql>> {
    vec![
        Box::new(lead.id.as_str().to_string()),
        Box::new(lead.tenant_id.as_str().to_string()),
        Box::new(lead.channel_identity.clone()),
        Box::new(lead.name.clone()),
        Box::new(lead.phone.clone()),
        Box::new(lead.language.code().to_string()),
        Box::new(lead.goal.map(|g| g.to_string())),
        Box::new(lead.transaction_type.map(|t| t.to_string())),
        Box::new(lead.property_category.map(|c| c.to_string())),
        Box::new(lead.property_type.as_ref().map(|t| t.to_string())),
        Box::new(lead.budget_min),
        Box::new(lead.budget_max),
        Box::new(lead.bedrooms_min),
        Box::new(lead.bedrooms_max),
        Box::new(serde_json::to_string(&lead.preferred_locations).unwrap()),
        Box::new(lead.payment_method.clone()),
        Box::new(lead.purpose.clone()),
        Box::new(lead.state.to_string()),
        Box::new(lead.pending_slot.clone()),
        Box::new(serde_json::to_string(&lead.filled_slots).unwrap()),
        Box::new(lead.conversation_data.to_string()),
        Box::new(lead.last_interaction.to_rfc3339()),
        Box::new(lead.ghost_reminder_sent as i32),
        Box::new(lead.fomo_messages_sent),
        Box::new(lead.urgency_score),
        Box::new(lead.messages_count),
        Box::new(lead.voice_messages_count),
        Box::new(lead.qr_scan_count),
        Box::new(lead.catalog_views),
        Box::new(lead.lead_score),
        Box::new(lead.temperature.to_string()),
        Box::new(lead.status.to_string()),
        Box::new(lead.created_at.to_rfc3339()),
        Box::new(lead.updated_at.to_rfc3339()),
    ]
}

fn row_to_tenant(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tenant> {
    let lang_code: String = row.get(2)?;
    let verticals_json: String = row.get(6)?;
    Ok(Tenant {
        id: TenantId::from(row.get::<_, String>(0)?),
        name: row.get(1)?,
        default_language: Language::from_code(&lang_code).unwrap_or_default(),
        branding_colour: row.get(3)?,
        admin_channel_identity: row.get(4)?,
        subscription_active: row.get::<_, i32>(5)? != 0,
        verticals: serde_json::from_str(&verticals_json).unwrap_or_default(),
    })
}

fn row_to_lead(row: &rusqlite::Row<'_>) -> rusqlite::Result<Lead> {
    let language: String = row.get(5)?;
    let preferred_locations_json: String = row.get(14)?;
    let filled_slots_json: String = row.get(19)?;
    let conversation_data_json: String = row.get(20)?;
    let last_interaction: String = row.get(21)?;
    let created_at: String = row.get(32)?;
    let updated_at: String = row.get(33)?;

    Ok(Lead {
        id: LeadId::from(row.get::<_, String>(0)?),
        tenant_id: TenantId::from(row.get::<_, String>(1)?),
        channel_identity: row.get(2)?,
        name: row.get(3)?,
        phone: row.get(4)?,
        language: Language::from_code(&language).unwrap_or_default(),
        goal: row
            .get::<_, Option<String>>(6)?
            .and_then(|s| Goal::from_str(&s).ok()),
        transaction_type: row
            .get::<_, Option<String>>(7)?
            .and_then(|s| TransactionType::from_str(&s).ok()),
        property_category: row
            .get::<_, Option<String>>(8)?
            .and_then(|s| PropertyCategory::from_str(&s).ok()),
        property_type: row
            .get::<_, Option<String>>(9)?
            .and_then(|s| PropertyType::from_str(&s).ok()),
        budget_min: row.get(10)?,
        budget_max: row.get(11)?,
        bedrooms_min: row.get(12)?,
        bedrooms_max: row.get(13)?,
        preferred_locations: serde_json::from_str::<HashSet<String>>(&preferred_locations_json)
            .unwrap_or_default(),
        payment_method: row.get(15)?,
        purpose: row.get(16)?,
        state: LeadState::from_str(&row.get::<_, String>(17)?).unwrap_or(LeadState::Start),
        pending_slot: row.get(18)?,
        filled_slots: serde_json::from_str(&filled_slots_json).unwrap_or_default(),
        conversation_data: serde_json::from_str(&conversation_data_json)
            .unwrap_or(serde_json::Value::Object(Default::default())),
        last_interaction: DateTime::parse_from_rfc3339(&last_interaction)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        ghost_reminder_sent: row.get::<_, i32>(22)? != 0,
        fomo_messages_sent: row.get(23)?,
        urgency_score: row.get(24)?,
        messages_count: row.get(25)?,
        voice_messages_count: row.get(26)?,
        qr_scan_count: row.get(27)?,
        catalog_views: row.get(28)?,
        lead_score: row.get(29)?,
        temperature: match row.get::<_, String>(30)?.as_str() {
            "warm" => Temperature::Warm,
            "hot" => Temperature::Hot,
            "burning" => Temperature::Burning,
            _ => Temperature::Cold,
        },
        status: LeadStatus::from_str(&row.get::<_, String>(31)?).unwrap_or(LeadStatus::New),
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        updated_at: DateTime::parse_from_rfc3339(&updated_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

fn row_to_property(row: &rusqlite::Row<'_>) -> rusqlite::Result<Property> {
    let media_refs_json: String = row.get(14)?;
    let created_at: String = row.get(15)?;
    Ok(Property {
        id: PropertyId::from(row.get::<_, String>(0)?),
        tenant_id: TenantId::from(row.get::<_, String>(1)?),
        title: row.get(2)?,
        price: row.get(3)?,
        bedrooms: row.get(4)?,
        location: row.get(5)?,
        property_type: PropertyType::from_str(&row.get::<_, String>(6)?).unwrap(),
        property_category: PropertyCategory::from_str(&row.get::<_, String>(7)?)
            .unwrap_or(PropertyCategory::Residential),
        is_featured: row.get::<_, i32>(8)? != 0,
        is_available: row.get::<_, i32>(9)? != 0,
        is_off_plan: row.get::<_, i32>(10)? != 0,
        is_urgent: row.get::<_, i32>(11)? != 0,
        golden_visa_eligible: row.get::<_, i32>(12)? != 0,
        expected_roi: row.get(13)?,
        media_refs: serde_json::from_str(&media_refs_json).unwrap_or_default(),
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

fn row_to_knowledge(row: &rusqlite::Row<'_>) -> rusqlite::Result<Knowledge> {
    let language: String = row.get(5)?;
    let keywords_json: String = row.get(6)?;
    Ok(Knowledge {
        id: KnowledgeId::from(row.get::<_, String>(0)?),
        tenant_id: TenantId::from(row.get::<_, String>(1)?),
        category: row.get(2)?,
        title: row.get(3)?,
        content: row.get(4)?,
        language: Language::from_code(&language).unwrap_or_default(),
        keywords: serde_json::from_str(&keywords_json).unwrap_or_default(),
        priority: row.get(7)?,
        is_active: row.get::<_, i32>(8)? != 0,
    })
}

fn row_to_slot(row: &rusqlite::Row<'_>) -> rusqlite::Result<ScheduleSlot> {
    Ok(ScheduleSlot {
        id: SlotId::from(row.get::<_, String>(0)?),
        tenant_id: TenantId::from(row.get::<_, String>(1)?),
        day_of_week: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        is_booked: row.get::<_, i32>(5)? != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqc_core::types::TenantId;

    fn test_tenant(store: &Store) -> TenantId {
        let tenant = Tenant {
            id: TenantId::new(),
            name: "Test Realty".into(),
            default_language: Language::En,
            branding_colour: None,
            admin_channel_identity: None,
            subscription_active: true,
            verticals: vec!["realty".into()],
        };
        store.create_tenant(&tenant).unwrap();
        tenant.id
    }

    #[test]
    fn lead_roundtrips_through_save_and_get() {
        let store = Store::in_memory().unwrap();
        let tenant_id = test_tenant(&store);
        let mut lead = store.get_or_create_lead(&tenant_id, "chat:1").unwrap();
        lead.state = LeadState::Warmup;
        lead.fill_slot("goal");
        store.save_lead(&lead).unwrap();

        let reloaded = store.get_lead(&lead.id).unwrap();
        assert_eq!(reloaded.state, LeadState::Warmup);
        assert!(reloaded.filled_slots.contains("goal"));
    }

    #[test]
    fn get_or_create_lead_is_idempotent() {
        let store = Store::in_memory().unwrap();
        let tenant_id = test_tenant(&store);
        let a = store.get_or_create_lead(&tenant_id, "chat:1").unwrap();
        let b = store.get_or_create_lead(&tenant_id, "chat:1").unwrap();
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn tenant_isolation_on_channel_identity() {
        let store = Store::in_memory().unwrap();
        let tenant_a = test_tenant(&store);
        let tenant_b = test_tenant(&store);
        let lead_a = store.get_or_create_lead(&tenant_a, "chat:1").unwrap();
        let lead_b = store.get_or_create_lead(&tenant_b, "chat:1").unwrap();
        assert_ne!(lead_a.id, lead_b.id);
    }

    #[test]
    fn booking_a_slot_twice_fails_the_second_time() {
        let store = Store::in_memory().unwrap();
        let tenant_id = test_tenant(&store);
        let lead = store.get_or_create_lead(&tenant_id, "chat:1").unwrap();
        let slot = ScheduleSlot {
            id: SlotId::new(),
            tenant_id: tenant_id.clone(),
            day_of_week: 1,
            start_time: "10:00".into(),
            end_time: "11:00".into(),
            is_booked: false,
        };
        store.insert_slot(&slot).unwrap();
        store.book_slot(&tenant_id, &slot.id, &lead.id).unwrap();
        assert!(store.book_slot(&tenant_id, &slot.id, &lead.id).is_err());
    }

    #[test]
    fn match_notification_dedup_table() {
        let store = Store::in_memory().unwrap();
        let tenant_id = test_tenant(&store);
        let lead = store.get_or_create_lead(&tenant_id, "chat:1").unwrap();
        let property_id = PropertyId::new();
        assert!(!store.already_notified(&lead.id, &property_id).unwrap());
        store.mark_notified(&lead.id, &property_id).unwrap();
        assert!(store.already_notified(&lead.id, &property_id).unwrap());
    }
}
