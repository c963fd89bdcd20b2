//! Idempotent schema creation. Safe to call on every startup.

use rusqlite::{Connection, Result};

pub fn init_db(conn: &Connection) -> Result<()> {
    create_tenants_table(conn)?;
    create_leads_table(conn)?;
    create_properties_table(conn)?;
    create_knowledge_table(conn)?;
    create_schedule_slots_table(conn)?;
    create_appointments_table(conn)?;
    create_property_notifications_table(conn)?;
    Ok(())
}

fn create_tenants_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS tenants (
            id                      TEXT PRIMARY KEY NOT NULL,
            name                    TEXT NOT NULL,
            default_language        TEXT NOT NULL DEFAULT 'en',
            branding_colour         TEXT,
            admin_channel_identity  TEXT,
            subscription_active     INTEGER NOT NULL DEFAULT 1,
            verticals               TEXT NOT NULL DEFAULT '[]'
        );",
    )
}

fn create_leads_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS leads (
            id                      TEXT PRIMARY KEY NOT NULL,
            tenant_id               TEXT NOT NULL,
            channel_identity        TEXT NOT NULL,
            name                    TEXT,
            phone                   TEXT,
            language                TEXT NOT NULL DEFAULT 'en',
            goal                    TEXT,
            transaction_type        TEXT,
            property_category       TEXT,
            property_type           TEXT,
            budget_min              INTEGER,
            budget_max              INTEGER,
            bedrooms_min            INTEGER,
            bedrooms_max            INTEGER,
            preferred_locations     TEXT NOT NULL DEFAULT '[]',
            payment_method          TEXT,
            purpose                 TEXT,
            state                   TEXT NOT NULL DEFAULT 'start',
            pending_slot            TEXT,
            filled_slots            TEXT NOT NULL DEFAULT '[]',
            conversation_data       TEXT NOT NULL DEFAULT '{}',
            last_interaction        TEXT NOT NULL,
            ghost_reminder_sent     INTEGER NOT NULL DEFAULT 0,
            fomo_messages_sent      INTEGER NOT NULL DEFAULT 0,
            urgency_score           INTEGER NOT NULL DEFAULT 0,
            messages_count          INTEGER NOT NULL DEFAULT 0,
            voice_messages_count    INTEGER NOT NULL DEFAULT 0,
            qr_scan_count           INTEGER NOT NULL DEFAULT 0,
            catalog_views           INTEGER NOT NULL DEFAULT 0,
            lead_score              INTEGER NOT NULL DEFAULT 0,
            temperature             TEXT NOT NULL DEFAULT 'cold',
            status                  TEXT NOT NULL DEFAULT 'new',
            created_at              TEXT NOT NULL,
            updated_at              TEXT NOT NULL,
            UNIQUE(tenant_id, channel_identity)
        );
        CREATE INDEX IF NOT EXISTS idx_leads_tenant ON leads(tenant_id);
        CREATE INDEX IF NOT EXISTS idx_leads_ghost ON leads(tenant_id, phone, state, ghost_reminder_sent, last_interaction);",
    )
}

fn create_properties_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS properties (
            id                      TEXT PRIMARY KEY NOT NULL,
            tenant_id               TEXT NOT NULL,
            title                   TEXT NOT NULL,
            price                   INTEGER NOT NULL,
            bedrooms                INTEGER NOT NULL,
            location                TEXT NOT NULL,
            property_type           TEXT NOT NULL,
            property_category       TEXT NOT NULL,
            is_featured             INTEGER NOT NULL DEFAULT 0,
            is_available            INTEGER NOT NULL DEFAULT 1,
            is_off_plan             INTEGER NOT NULL DEFAULT 0,
            is_urgent               INTEGER NOT NULL DEFAULT 0,
            golden_visa_eligible    INTEGER NOT NULL DEFAULT 0,
            expected_roi            REAL,
            media_refs              TEXT NOT NULL DEFAULT '[]',
            created_at              TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_properties_tenant ON properties(tenant_id, is_available);",
    )
}

fn create_knowledge_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS knowledge (
            id                      TEXT PRIMARY KEY NOT NULL,
            tenant_id               TEXT NOT NULL,
            category                TEXT NOT NULL,
            title                   TEXT NOT NULL,
            content                 TEXT NOT NULL,
            language                TEXT NOT NULL DEFAULT 'en',
            keywords                TEXT NOT NULL DEFAULT '[]',
            priority                INTEGER NOT NULL DEFAULT 0,
            is_active               INTEGER NOT NULL DEFAULT 1
        );
        CREATE INDEX IF NOT EXISTS idx_knowledge_tenant ON knowledge(tenant_id, language, is_active);",
    )
}

fn create_schedule_slots_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schedule_slots (
            id                      TEXT PRIMARY KEY NOT NULL,
            tenant_id               TEXT NOT NULL,
            day_of_week             INTEGER NOT NULL,
            start_time              TEXT NOT NULL,
            end_time                TEXT NOT NULL,
            is_booked               INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_slots_tenant ON schedule_slots(tenant_id, is_booked);",
    )
}

fn create_appointments_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS appointments (
            id                      TEXT PRIMARY KEY NOT NULL,
            tenant_id               TEXT NOT NULL,
            lead_id                 TEXT NOT NULL,
            slot_id                 TEXT NOT NULL UNIQUE,
            status                  TEXT NOT NULL DEFAULT 'scheduled',
            created_at              TEXT NOT NULL
        );",
    )
}

/// Per-(lead, property) dedup table for the match notifier (spec §4.8;
/// §9 open question resolved by adding this table explicitly).
fn create_property_notifications_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS property_notifications (
            lead_id                 TEXT NOT NULL,
            property_id             TEXT NOT NULL,
            notified_at             TEXT NOT NULL,
            PRIMARY KEY (lead_id, property_id)
        );",
    )
}
