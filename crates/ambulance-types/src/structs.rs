//! Entity records, the intake payload, and the read models served to the
//! request-handling layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

use crate::enums::{AmbulanceStatus, LogLevel, PatientStatus};
use crate::ids::{AmbulanceId, HospitalId, PatientId};

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Location {
    /// Latitude in degrees, `-90..=90`.
    pub lat: f64,
    /// Longitude in degrees, `-180..=180`.
    pub lng: f64,
}

impl Location {
    /// Build a location from latitude and longitude.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both coordinates are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl core::fmt::Display for Location {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A patient created on emergency intake.
///
/// The location is fixed at creation. Records are never deleted, only moved
/// to [`PatientStatus::Completed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Patient {
    /// Patient identifier.
    pub id: PatientId,
    /// Name given on intake.
    pub name: String,
    /// Age in years, if provided.
    pub age: Option<u32>,
    /// Free-text description of the condition.
    pub condition: String,
    /// Lifecycle state.
    pub status: PatientStatus,
    /// Pickup location.
    pub location: Location,
    /// Intake timestamp.
    pub created_at: DateTime<Utc>,
    /// Ambulance assigned by dispatch.
    pub ambulance_id: Option<AmbulanceId>,
    /// Destination hospital chosen by dispatch.
    pub hospital_id: Option<HospitalId>,
    /// Estimated seconds until pickup, computed at dispatch time.
    pub eta_seconds: Option<u64>,
}

/// An ambulance in the fleet.
///
/// An ambulance on an active leg always has both `current_patient` and
/// `target`; an [`AmbulanceStatus::Available`] one has neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Ambulance {
    /// Ambulance identifier.
    pub id: AmbulanceId,
    /// Driver identifier.
    pub driver_id: String,
    /// Driver display name.
    pub driver_name: String,
    /// Lifecycle state.
    pub status: AmbulanceStatus,
    /// Current position, updated every tick while moving.
    pub location: Location,
    /// Patient being served.
    pub current_patient: Option<PatientId>,
    /// Where the ambulance is heading.
    pub target: Option<Location>,
}

impl Ambulance {
    /// Create an idle ambulance at `location`.
    pub fn available(
        id: AmbulanceId,
        driver_id: impl Into<String>,
        driver_name: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            id,
            driver_id: driver_id.into(),
            driver_name: driver_name.into(),
            status: AmbulanceStatus::Available,
            location,
            current_patient: None,
            target: None,
        }
    }
}

/// A destination hospital.
///
/// Bed counts are advisory: they feed the scoring function and are never
/// decremented by dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Hospital {
    /// Hospital identifier.
    pub id: HospitalId,
    /// Display name.
    pub name: String,
    /// Fixed location.
    pub location: Location,
    /// Total general beds.
    pub general_beds: u32,
    /// General beds currently free.
    pub general_beds_available: u32,
    /// Total ICU beds.
    pub icu_beds: u32,
    /// ICU beds currently free.
    pub icu_beds_available: u32,
}

impl Hospital {
    /// Whether at least one ICU bed is free.
    pub const fn has_icu_available(&self) -> bool {
        self.icu_beds_available > 0
    }

    /// Whether at least one general bed is free.
    pub const fn has_general_bed_available(&self) -> bool {
        self.general_beds_available > 0
    }
}

/// One line of the collaborator-facing audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SystemLogEntry {
    /// When the entry was appended.
    pub timestamp: DateTime<Utc>,
    /// Human-readable message.
    pub message: String,
    /// Severity.
    pub level: LogLevel,
}

// ---------------------------------------------------------------------------
// Intake
// ---------------------------------------------------------------------------

/// An incoming emergency request, validated before any state changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EmergencyRequest {
    /// Patient name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Patient age in years.
    #[validate(range(max = 150))]
    pub age: Option<u32>,
    /// Free-text condition, e.g. `"cardiac arrest"`.
    #[validate(length(min = 1, max = 500))]
    pub condition: String,
    /// Pickup latitude.
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    /// Pickup longitude.
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl EmergencyRequest {
    /// The pickup location carried by the request.
    pub const fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }
}

/// Result of a successful intake and dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EmergencyReceipt {
    /// The newly created patient.
    pub patient_id: PatientId,
    /// The ambulance sent to the patient.
    pub ambulance_id: AmbulanceId,
    /// The destination hospital.
    pub hospital_id: HospitalId,
    /// Estimated seconds until pickup.
    pub eta_seconds: u64,
}

// ---------------------------------------------------------------------------
// Read models
// ---------------------------------------------------------------------------

/// A patient joined with its ambulance position and hospital destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PatientStatusView {
    /// Patient identifier.
    pub patient_id: PatientId,
    /// Patient name.
    pub name: String,
    /// Patient age.
    pub age: Option<u32>,
    /// Condition text.
    pub condition: String,
    /// Lifecycle state.
    pub status: PatientStatus,
    /// Pickup location.
    pub location: Location,
    /// Where the assigned ambulance is right now.
    pub ambulance_location: Option<Location>,
    /// Live estimate for the current leg, in seconds.
    pub ambulance_eta_seconds: Option<u64>,
    /// Destination hospital location.
    pub hospital_location: Option<Location>,
    /// Destination hospital name.
    pub hospital_name: Option<String>,
}

/// Polling snapshot for live-map clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MapState {
    /// The first patient in intake order that is not completed.
    pub active_patient: Option<PatientStatusView>,
    /// Every ambulance, in fleet order.
    pub ambulances: Vec<Ambulance>,
    /// Every hospital, in registration order.
    pub hospitals: Vec<Hospital>,
}

/// Map state plus the most recent log entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AdminDashboard {
    /// The live map snapshot.
    pub map: MapState,
    /// Newest log entries, oldest first.
    pub logs: Vec<SystemLogEntry>,
}

/// A window onto the system log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LogPage {
    /// Newest entries, oldest first.
    pub logs: Vec<SystemLogEntry>,
    /// Number of entries currently retained.
    #[ts(type = "number")]
    pub total: usize,
}
