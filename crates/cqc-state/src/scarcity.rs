use chrono::Utc;
use cqc_store::types::Property;

/// Everything appended to a `VALUE_PROPOSITION` property card (spec §4.6).
#[derive(Debug, Clone)]
pub struct ScarcityAnnotation {
    pub scarcity_line: String,
    pub social_proof_line: String,
    pub time_pressure_line: Option<String>,
}

/// Deterministic per-property-per-day hash, so the same property shows the
/// same scarcity numbers all day and different numbers tomorrow, without any
/// stored state (spec §4.6: "pseudo-randomised but deterministic per
/// property per day").
fn daily_hash(property_id: &str) -> u64 {
    let day = Utc::now().format("%Y-%m-%d").to_string();
    let mut hash: u64 = 1469598103934665603; // FNV-1a offset basis
    for byte in property_id.bytes().chain(day.bytes()) {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(1099511628211);
    }
    hash
}

pub fn annotate(property: &Property) -> ScarcityAnnotation {
    let hash = daily_hash(property.id.as_str());

    let (units_lo, units_hi) = if property.price > 5_000_000 {
        (1u64, 2u64)
    } else if property.price > 2_000_000 {
        (2, 4)
    } else {
        (3, 6)
    };
    let units = units_lo + hash % (units_hi - units_lo + 1);
    let scarcity_line = if units == 1 {
        "Only 1 unit left at this price.".to_string()
    } else {
        format!("Only {units} units left at this price.")
    };

    let (viewers_lo, viewers_hi) = if property.is_featured { (5u64, 12u64) } else { (2, 6) };
    let viewers = viewers_lo + (hash / 7) % (viewers_hi - viewers_lo + 1);
    let social_proof_line = format!("{viewers} people viewed this today.");

    let time_pressure_line = property
        .is_urgent
        .then(|| "This listing is expected to close within days.".to_string());

    ScarcityAnnotation {
        scarcity_line,
        social_proof_line,
        time_pressure_line,
    }
}

/// Emitted when no properties matched the lead's slots (spec §4.6).
pub const HOT_MARKET_MESSAGE: &str =
    "The market here is moving fast right now — let's widen the search a little.";

#[cfg(test)]
mod tests {
    use super::*;
    use cqc_core::types::{PropertyId, TenantId};
    use cqc_store::types::PropertyCategory;
    use cqc_store::types::PropertyType;

    fn property(price: i64, featured: bool, urgent: bool) -> Property {
        Property {
            id: PropertyId::default(),
            tenant_id: TenantId::default(),
            title: "Test".into(),
            price,
            bedrooms: 2,
            location: "Dubai Marina".into(),
            property_type: PropertyType::Apartment,
            property_category: PropertyCategory::Residential,
            is_featured: featured,
            is_available: true,
            is_off_plan: false,
            is_urgent: urgent,
            golden_visa_eligible: false,
            expected_roi: None,
            media_refs: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn annotation_is_stable_within_the_same_day() {
        let p = property(3_000_000, true, false);
        let a1 = annotate(&p);
        let a2 = annotate(&p);
        assert_eq!(a1.scarcity_line, a2.scarcity_line);
        assert_eq!(a1.social_proof_line, a2.social_proof_line);
    }

    #[test]
    fn urgent_property_gets_a_time_pressure_line() {
        let p = property(1_000_000, false, true);
        assert!(annotate(&p).time_pressure_line.is_some());
    }

    #[test]
    fn non_urgent_property_has_no_time_pressure_line() {
        let p = property(1_000_000, false, false);
        assert!(annotate(&p).time_pressure_line.is_none());
    }
}
