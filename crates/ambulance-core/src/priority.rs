//! Condition severity and destination-hospital scoring.
//!
//! Severity comes from a keyword table scanned in order; the first keyword
//! found in the lowercased condition text wins. Hospitals are scored by
//!
//! ```text
//! distance_km * (1 + (10 - severity) / 10) * icu_factor * bed_factor
//! ```
//!
//! doubled when a critical patient (severity >= 8) would go to a hospital
//! with no free ICU bed. Lower is better.

use ambulance_types::{Hospital, Location};

use crate::geo;

/// Severity used when no keyword matches.
pub const DEFAULT_SEVERITY: u8 = 5;

/// Severity at and above which a free ICU bed is required to avoid the
/// critical-care penalty.
pub const CRITICAL_SEVERITY: u8 = 8;

/// Keyword table. Order is significant: the first match wins.
pub const SEVERITY_TABLE: &[(&str, u8)] = &[
    ("cardiac", 10),
    ("stroke", 9),
    ("severe_bleeding", 8),
    ("breathing_difficulty", 8),
    ("unconscious", 9),
    ("fracture", 3),
    ("fever", 2),
    ("unknown", DEFAULT_SEVERITY),
];

const ICU_AVAILABLE_FACTOR: f64 = 0.5;
const ICU_MISSING_FACTOR: f64 = 1.0;
const BED_AVAILABLE_FACTOR: f64 = 0.7;
const BED_MISSING_FACTOR: f64 = 1.2;
const CRITICAL_WITHOUT_ICU_PENALTY: f64 = 2.0;

/// Map a free-text condition to a severity between 2 and 10.
pub fn severity_of(condition: &str) -> u8 {
    let text = condition.to_lowercase();
    SEVERITY_TABLE
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map_or(DEFAULT_SEVERITY, |&(_, severity)| severity)
}

/// Score one hospital for a patient at `patient` with the given severity.
pub fn score(patient: Location, severity: u8, hospital: &Hospital) -> f64 {
    let distance = geo::distance_km(patient, hospital.location);
    let urgency_weight = 1.0 + f64::from(10_u8.saturating_sub(severity)) / 10.0;
    let icu_factor = if hospital.has_icu_available() {
        ICU_AVAILABLE_FACTOR
    } else {
        ICU_MISSING_FACTOR
    };
    let bed_factor = if hospital.has_general_bed_available() {
        BED_AVAILABLE_FACTOR
    } else {
        BED_MISSING_FACTOR
    };

    let raw = distance * urgency_weight * icu_factor * bed_factor;
    if severity >= CRITICAL_SEVERITY && !hospital.has_icu_available() {
        raw * CRITICAL_WITHOUT_ICU_PENALTY
    } else {
        raw
    }
}

/// Pick the hospital with the strictly lowest score.
///
/// Ties keep the earlier hospital in `hospitals` order. Returns `None` for
/// an empty candidate list.
pub fn select_hospital<'a, I>(patient: Location, condition: &str, hospitals: I) -> Option<&'a Hospital>
where
    I: IntoIterator<Item = &'a Hospital>,
{
    let severity = severity_of(condition);
    let mut best: Option<(&Hospital, f64)> = None;
    for hospital in hospitals {
        let candidate = score(patient, severity, hospital);
        match best {
            Some((_, best_score)) if candidate >= best_score => {}
            _ => best = Some((hospital, candidate)),
        }
    }
    best.map(|(hospital, _)| hospital)
}
