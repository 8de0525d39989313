//! Error types for the `ambulance-core` crate.
//!
//! [`DispatchError`] is what callers of the dispatch service see. Every
//! variant is non-fatal: the operation that raised it made no changes.
//! [`TickError`] covers faults while advancing a single ambulance; the
//! simulator logs those and moves on to the next ambulance.

use ambulance_types::{AmbulanceId, HospitalId, PatientId, PatientStatus};

/// Which kind of record a transition error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A [`ambulance_types::Patient`].
    Patient,
    /// An [`ambulance_types::Ambulance`].
    Ambulance,
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Patient => f.write_str("patient"),
            Self::Ambulance => f.write_str("ambulance"),
        }
    }
}

/// Errors returned by dispatch, admin, and query operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    /// No idle ambulance, or no hospital with capacity.
    #[error("resource unavailable: {reason}")]
    ResourceUnavailable {
        /// What was missing.
        reason: String,
    },

    /// No patient with this id.
    #[error("patient not found: {0}")]
    PatientNotFound(PatientId),

    /// No ambulance with this id.
    #[error("ambulance not found: {0}")]
    AmbulanceNotFound(AmbulanceId),

    /// No hospital with this id.
    #[error("hospital not found: {0}")]
    HospitalNotFound(HospitalId),

    /// The request was malformed and was rejected before any change.
    #[error("validation failed: {message}")]
    Validation {
        /// Description of the offending fields.
        message: String,
    },

    /// The record is not in a state that allows the requested move.
    #[error("invalid {entity} transition from {from} to {to}")]
    InvalidTransition {
        /// Kind of record.
        entity: EntityKind,
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },

    /// The dispatch service has stopped and no longer accepts commands.
    #[error("dispatch service is not running")]
    ServiceUnavailable,
}

impl From<validator::ValidationErrors> for DispatchError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation {
            message: errors.to_string(),
        }
    }
}

/// Faults raised while advancing one ambulance during a tick.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TickError {
    /// The ambulance arrived but has no current patient.
    #[error("ambulance {0} arrived without a current patient")]
    MissingPatientLink(AmbulanceId),

    /// The ambulance points at a patient that does not exist.
    #[error("ambulance {ambulance} carries unknown patient {patient}")]
    PatientNotFound {
        /// The ambulance.
        ambulance: AmbulanceId,
        /// The dangling patient id.
        patient: PatientId,
    },

    /// The patient record names a different ambulance.
    #[error("ambulance {ambulance} and patient {patient} are not paired")]
    PairingMismatch {
        /// The ambulance.
        ambulance: AmbulanceId,
        /// The patient it claims to carry.
        patient: PatientId,
    },

    /// The patient has no destination hospital, or it does not exist.
    #[error("patient {patient} has no reachable destination hospital")]
    HospitalNotFound {
        /// The patient.
        patient: PatientId,
    },

    /// The ambulance arrived but its patient is in no leg of a trip.
    #[error("patient {patient} is {status}, expected PICKUP or TO_HOSPITAL")]
    UnexpectedPatientStatus {
        /// The patient.
        patient: PatientId,
        /// Its current status.
        status: PatientStatus,
    },

    /// A lifecycle transition was refused.
    #[error("transition refused: {source}")]
    Transition {
        /// The refused transition.
        #[from]
        source: DispatchError,
    },
}
