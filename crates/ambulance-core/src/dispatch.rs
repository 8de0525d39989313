//! Emergency intake and the dispatch coordinator.
//!
//! Dispatch picks the first available ambulance in fleet order and scores
//! the hospitals that have a free general bed. Both selections happen
//! before anything is written; the ambulance and patient are then updated
//! on copies and saved together, so a failed dispatch leaves the store
//! exactly as it was.

use ambulance_types::{
    Ambulance, AmbulanceId, AmbulanceStatus, EmergencyReceipt, EmergencyRequest, HospitalId,
    Patient, PatientId, PatientStatus,
};
use chrono::Utc;
use tracing::debug;
use validator::Validate;

use crate::error::{DispatchError, EntityKind};
use crate::eta;
use crate::lifecycle;
use crate::log::LogSink;
use crate::priority;
use crate::store::Store;

/// The reservation made by a successful dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    /// The ambulance now heading to the patient.
    pub ambulance_id: AmbulanceId,
    /// The destination hospital.
    pub hospital_id: HospitalId,
    /// Estimated seconds until pickup.
    pub eta_seconds: u64,
}

/// Validate a request, record a `WAITING` patient, and dispatch it.
///
/// When dispatch reports [`DispatchError::ResourceUnavailable`] the patient
/// stays recorded as `WAITING` so it can be dispatched again later.
///
/// # Errors
///
/// [`DispatchError::Validation`] before any change, or whatever
/// [`dispatch`] returns.
pub fn submit_emergency(
    store: &mut Store,
    log: &mut dyn LogSink,
    request: &EmergencyRequest,
    speed_kmh: f64,
) -> Result<EmergencyReceipt, DispatchError> {
    let patient = admit(request)?;
    let patient_id = patient.id;
    log.info(format!(
        "New emergency request: {}, condition: {}",
        patient.name, patient.condition
    ));
    store.patients.save(patient);

    let assignment = dispatch(store, log, patient_id, speed_kmh)?;
    Ok(EmergencyReceipt {
        patient_id,
        ambulance_id: assignment.ambulance_id,
        hospital_id: assignment.hospital_id,
        eta_seconds: assignment.eta_seconds,
    })
}

/// Turn a request into a fresh `WAITING` patient.
fn admit(request: &EmergencyRequest) -> Result<Patient, DispatchError> {
    request.validate()?;
    let location = request.location();
    if !location.is_valid() {
        return Err(DispatchError::Validation {
            message: format!("location {location} is outside WGS84 bounds"),
        });
    }
    if request.condition.trim().is_empty() {
        return Err(DispatchError::Validation {
            message: String::from("condition must not be blank"),
        });
    }
    if request.name.trim().is_empty() {
        return Err(DispatchError::Validation {
            message: String::from("name must not be blank"),
        });
    }

    Ok(Patient {
        id: PatientId::new(),
        name: request.name.trim().to_owned(),
        age: request.age,
        condition: request.condition.trim().to_owned(),
        status: PatientStatus::Waiting,
        location,
        created_at: Utc::now(),
        ambulance_id: None,
        hospital_id: None,
        eta_seconds: None,
    })
}

/// Reserve an ambulance and a hospital for a `WAITING` patient.
///
/// On success exactly one ambulance moves `AVAILABLE -> ASSIGNED`, the
/// patient moves `WAITING -> PICKUP`, and one info entry is logged.
///
/// # Errors
///
/// - [`DispatchError::PatientNotFound`] for an unknown id.
/// - [`DispatchError::InvalidTransition`] if the patient is not `WAITING`.
/// - [`DispatchError::ResourceUnavailable`] if no ambulance is idle or no
///   hospital has a free bed; a warning is logged and nothing changes.
pub fn dispatch(
    store: &mut Store,
    log: &mut dyn LogSink,
    patient_id: PatientId,
    speed_kmh: f64,
) -> Result<Assignment, DispatchError> {
    let patient = store
        .patients
        .get(patient_id)
        .ok_or(DispatchError::PatientNotFound(patient_id))?;
    if !patient.status.can_advance_to(PatientStatus::Pickup) {
        return Err(DispatchError::InvalidTransition {
            entity: EntityKind::Patient,
            from: patient.status.to_string(),
            to: PatientStatus::Pickup.to_string(),
        });
    }

    let Some(ambulance) = first_available(store) else {
        log.warning(format!("No available ambulances for patient {patient_id}"));
        return Err(DispatchError::ResourceUnavailable {
            reason: String::from("no available ambulances"),
        });
    };

    let with_beds = store
        .hospitals
        .iter()
        .filter(|hospital| hospital.has_general_bed_available());
    let Some(hospital) = priority::select_hospital(patient.location, &patient.condition, with_beds)
    else {
        log.warning(format!("No available hospitals for patient {patient_id}"));
        return Err(DispatchError::ResourceUnavailable {
            reason: String::from("no hospital with available beds"),
        });
    };

    let eta_seconds = eta::eta_seconds(ambulance.location, patient.location, speed_kmh);
    debug!(
        patient = %patient_id,
        ambulance = %ambulance.id,
        hospital = %hospital.id,
        severity = priority::severity_of(&patient.condition),
        eta_seconds,
        "Dispatch selection made"
    );

    let mut ambulance = ambulance.clone();
    let mut patient = patient.clone();
    let hospital_id = hospital.id;
    lifecycle::assign_ambulance(&mut ambulance, patient.id, patient.location)?;
    lifecycle::assign_patient(&mut patient, ambulance.id, hospital_id, eta_seconds)?;

    let assignment = Assignment {
        ambulance_id: ambulance.id,
        hospital_id,
        eta_seconds,
    };
    store.ambulances.save(ambulance);
    store.patients.save(patient);

    log.info(format!(
        "Ambulance {} dispatched to patient {patient_id}",
        assignment.ambulance_id
    ));
    Ok(assignment)
}

fn first_available(store: &Store) -> Option<&Ambulance> {
    store
        .ambulances
        .iter()
        .find(|ambulance| ambulance.status == AmbulanceStatus::Available)
}
