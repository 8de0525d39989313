//! Status and severity enumerations.
//!
//! Statuses are closed enums with forward-only transition tables. The
//! administrative release of an ambulance is the one backward move and is
//! not expressed here; it lives with the admin operations in the core crate.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Patient
// ---------------------------------------------------------------------------

/// Lifecycle state of a patient.
///
/// `Waiting -> Pickup -> ToHospital -> Completed`. [`PatientStatus::Arrived`]
/// is part of the wire vocabulary but no transition ever targets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum PatientStatus {
    /// Intake recorded, no ambulance assigned yet.
    Waiting,
    /// An ambulance is driving to the patient.
    Pickup,
    /// The patient is on board and heading to the hospital.
    ToHospital,
    /// Declared but unreachable.
    Arrived,
    /// Delivered to the hospital (or closed by an operator).
    Completed,
}

impl PatientStatus {
    /// Whether the simulator or dispatcher may move a patient from `self`
    /// to `next`.
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Waiting, Self::Pickup)
                | (Self::Pickup, Self::ToHospital)
                | (Self::ToHospital, Self::Completed)
        )
    }

    /// Whether no further transition is possible.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl core::fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::Waiting => "WAITING",
            Self::Pickup => "PICKUP",
            Self::ToHospital => "TO_HOSPITAL",
            Self::Arrived => "ARRIVED",
            Self::Completed => "COMPLETED",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Ambulance
// ---------------------------------------------------------------------------

/// Lifecycle state of an ambulance.
///
/// `Available -> Assigned -> ToHospital -> Completed`, then back to
/// `Available` only through an explicit release.
/// [`AmbulanceStatus::PickingUp`] is declared but never targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum AmbulanceStatus {
    /// Idle in the pool, no patient and no target.
    Available,
    /// Driving to a patient.
    Assigned,
    /// Declared but unreachable.
    PickingUp,
    /// Carrying a patient to a hospital.
    ToHospital,
    /// Delivered; waiting for operator release.
    Completed,
}

impl AmbulanceStatus {
    /// Whether the dispatcher or simulator may move an ambulance from
    /// `self` to `next`. Release is not a forward transition.
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Available, Self::Assigned)
                | (Self::Assigned, Self::ToHospital)
                | (Self::ToHospital, Self::Completed)
        )
    }

    /// Whether the ambulance is on an active leg and must carry a patient
    /// and a target.
    pub const fn is_in_flight(self) -> bool {
        matches!(self, Self::Assigned | Self::PickingUp | Self::ToHospital)
    }
}

impl core::fmt::Display for AmbulanceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::Available => "AVAILABLE",
            Self::Assigned => "ASSIGNED",
            Self::PickingUp => "PICKING_UP",
            Self::ToHospital => "TO_HOSPITAL",
            Self::Completed => "COMPLETED",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// System log
// ---------------------------------------------------------------------------

/// Severity of a system log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum LogLevel {
    /// Routine lifecycle event.
    Info,
    /// A request could not be served.
    Warning,
    /// A fault inside the engine.
    Error,
}
