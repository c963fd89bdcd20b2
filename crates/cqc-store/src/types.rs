//! Domain entities: Tenant, Lead, Property, Knowledge, ScheduleSlot, Appointment.

use chrono::{DateTime, Utc};
use cqc_core::types::{AppointmentId, KnowledgeId, Language, LeadId, PropertyId, SlotId, TenantId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

/// The agency. Embeds the set of deep-link verticals it recognises.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub default_language: Language,
    pub branding_colour: Option<String>,
    /// Channel identity that receives Hot-Lead alerts; `None` until `/set_admin`.
    pub admin_channel_identity: Option<String>,
    pub subscription_active: bool,
    /// Recognised deep-link verticals, e.g. `["realty", "expo", "support"]`.
    pub verticals: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Investment,
    Living,
    Residency,
    Rent,
}

impl FromStr for Goal {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "investment" => Ok(Goal::Investment),
            "living" => Ok(Goal::Living),
            "residency" => Ok(Goal::Residency),
            "rent" => Ok(Goal::Rent),
            other => Err(format!("unknown goal: {other}")),
        }
    }
}

impl std::fmt::Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Goal::Investment => "investment",
            Goal::Living => "living",
            Goal::Residency => "residency",
            Goal::Rent => "rent",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Buy,
    Rent,
}

impl Goal {
    /// `residency` and `investment`/`living` all imply a purchase; only
    /// an explicit `rent` goal implies the rent transaction type.
    pub fn implied_transaction_type(&self) -> TransactionType {
        match self {
            Goal::Rent => TransactionType::Rent,
            Goal::Investment | Goal::Living | Goal::Residency => TransactionType::Buy,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Buy => write!(f, "buy"),
            TransactionType::Rent => write!(f, "rent"),
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(TransactionType::Buy),
            "rent" => Ok(TransactionType::Rent),
            other => Err(format!("unknown transaction_type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyCategory {
    Residential,
    Commercial,
}

impl std::fmt::Display for PropertyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyCategory::Residential => write!(f, "residential"),
            PropertyCategory::Commercial => write!(f, "commercial"),
        }
    }
}

impl FromStr for PropertyCategory {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "residential" => Ok(PropertyCategory::Residential),
            "commercial" => Ok(PropertyCategory::Commercial),
            other => Err(format!("unknown property_category: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Apartment,
    Villa,
    Townhouse,
    Penthouse,
    Office,
    Shop,
    Other(String),
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyType::Apartment => write!(f, "apartment"),
            PropertyType::Villa => write!(f, "villa"),
            PropertyType::Townhouse => write!(f, "townhouse"),
            PropertyType::Penthouse => write!(f, "penthouse"),
            PropertyType::Office => write!(f, "office"),
            PropertyType::Shop => write!(f, "shop"),
            PropertyType::Other(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for PropertyType {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "apartment" => PropertyType::Apartment,
            "villa" => PropertyType::Villa,
            "townhouse" => PropertyType::Townhouse,
            "penthouse" => PropertyType::Penthouse,
            "office" => PropertyType::Office,
            "shop" => PropertyType::Shop,
            other => PropertyType::Other(other.to_string()),
        })
    }
}

/// The nine-phase dialogue state (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadState {
    Start,
    LanguageSelected,
    Warmup,
    CaptureContact,
    SlotFilling,
    ValueProposition,
    Engagement,
    HandoffSchedule,
    Completed,
}

impl std::fmt::Display for LeadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LeadState::Start => "start",
            LeadState::LanguageSelected => "language_selected",
            LeadState::Warmup => "warmup",
            LeadState::CaptureContact => "capture_contact",
            LeadState::SlotFilling => "slot_filling",
            LeadState::ValueProposition => "value_proposition",
            LeadState::Engagement => "engagement",
            LeadState::HandoffSchedule => "handoff_schedule",
            LeadState::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

impl FromStr for LeadState {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "start" => LeadState::Start,
            "language_selected" => LeadState::LanguageSelected,
            "warmup" => LeadState::Warmup,
            "capture_contact" => LeadState::CaptureContact,
            "slot_filling" => LeadState::SlotFilling,
            "value_proposition" => LeadState::ValueProposition,
            "engagement" => LeadState::Engagement,
            "handoff_schedule" => LeadState::HandoffSchedule,
            "completed" => LeadState::Completed,
            other => return Err(format!("unknown lead state: {other}")),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Qualified,
    Hot,
    ViewingScheduled,
    ClosedWon,
    ClosedLost,
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LeadStatus::New => "new",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Hot => "hot",
            LeadStatus::ViewingScheduled => "viewing_scheduled",
            LeadStatus::ClosedWon => "closed_won",
            LeadStatus::ClosedLost => "closed_lost",
        };
        write!(f, "{s}")
    }
}

impl FromStr for LeadStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "new" => LeadStatus::New,
            "qualified" => LeadStatus::Qualified,
            "hot" => LeadStatus::Hot,
            "viewing_scheduled" => LeadStatus::ViewingScheduled,
            "closed_won" => LeadStatus::ClosedWon,
            "closed_lost" => LeadStatus::ClosedLost,
            other => return Err(format!("unknown lead status: {other}")),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Temperature {
    Cold,
    Warm,
    Hot,
    Burning,
}

impl Temperature {
    /// Bucket boundaries per spec §3 invariant 6: 0-24 cold, 25-49 warm, 50-69 hot, 70-100 burning.
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=24 => Temperature::Cold,
            25..=49 => Temperature::Warm,
            50..=69 => Temperature::Hot,
            _ => Temperature::Burning,
        }
    }
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Temperature::Cold => "cold",
            Temperature::Warm => "warm",
            Temperature::Hot => "hot",
            Temperature::Burning => "burning",
        };
        write!(f, "{s}")
    }
}

/// One prospect per (tenant, channel identity).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub tenant_id: TenantId,
    pub channel_identity: String,

    pub name: Option<String>,
    pub phone: Option<String>,
    pub language: Language,

    pub goal: Option<Goal>,
    pub transaction_type: Option<TransactionType>,
    pub property_category: Option<PropertyCategory>,
    pub property_type: Option<PropertyType>,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub bedrooms_min: Option<i32>,
    pub bedrooms_max: Option<i32>,
    pub preferred_locations: HashSet<String>,
    pub payment_method: Option<String>,
    pub purpose: Option<String>,

    pub state: LeadState,
    pub pending_slot: Option<String>,
    pub filled_slots: HashSet<String>,
    /// Free-form scratch space used by handlers across a single session.
    pub conversation_data: serde_json::Value,
    pub last_interaction: DateTime<Utc>,
    pub ghost_reminder_sent: bool,
    pub fomo_messages_sent: u32,
    pub urgency_score: u32,

    pub messages_count: u32,
    pub voice_messages_count: u32,
    pub qr_scan_count: u32,
    pub catalog_views: u32,
    pub lead_score: u32,
    pub temperature: Temperature,

    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    pub fn new(tenant_id: TenantId, channel_identity: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: LeadId::new(),
            tenant_id,
            channel_identity: channel_identity.into(),
            name: None,
            phone: None,
            language: Language::En,
            goal: None,
            transaction_type: None,
            property_category: None,
            property_type: None,
            budget_min: None,
            budget_max: None,
            bedrooms_min: None,
            bedrooms_max: None,
            preferred_locations: HashSet::new(),
            payment_method: None,
            purpose: None,
            state: LeadState::Start,
            pending_slot: None,
            filled_slots: HashSet::new(),
            conversation_data: serde_json::Value::Object(Default::default()),
            last_interaction: now,
            ghost_reminder_sent: false,
            fomo_messages_sent: 0,
            urgency_score: 0,
            messages_count: 0,
            voice_messages_count: 0,
            qr_scan_count: 0,
            catalog_views: 0,
            lead_score: 0,
            temperature: Temperature::Cold,
            status: LeadStatus::New,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark a slot filled; per spec invariant 3 this set only grows within a
    /// session, reset by an explicit `/start`.
    pub fn fill_slot(&mut self, slot: &str) {
        self.filled_slots.insert(slot.to_string());
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub tenant_id: TenantId,
    pub title: String,
    pub price: i64,
    pub bedrooms: i32,
    pub location: String,
    pub property_type: PropertyType,
    pub property_category: PropertyCategory,
    pub is_featured: bool,
    pub is_available: bool,
    pub is_off_plan: bool,
    pub is_urgent: bool,
    pub golden_visa_eligible: bool,
    pub expected_roi: Option<f64>,
    pub media_refs: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Knowledge {
    pub id: KnowledgeId,
    pub tenant_id: TenantId,
    pub category: String,
    pub title: String,
    pub content: String,
    pub language: Language,
    pub keywords: Vec<String>,
    pub priority: u32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub id: SlotId,
    pub tenant_id: TenantId,
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
    pub is_booked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "scheduled" => AppointmentStatus::Scheduled,
            "completed" => AppointmentStatus::Completed,
            "cancelled" => AppointmentStatus::Cancelled,
            other => return Err(format!("unknown appointment status: {other}")),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub tenant_id: TenantId,
    pub lead_id: LeadId,
    pub slot_id: SlotId,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}
