//! Guarded status transitions for patients and ambulances.
//!
//! Each helper checks the source state first and returns
//! [`DispatchError::InvalidTransition`] without touching the record when the
//! move is not allowed. On success the status and its paired fields change
//! together, so the ambulance invariant (in flight implies a patient and a
//! target, available implies neither) holds after every call.

use ambulance_types::{
    Ambulance, AmbulanceId, AmbulanceStatus, HospitalId, Location, Patient, PatientId,
    PatientStatus,
};

use crate::error::{DispatchError, EntityKind};

fn refuse_patient(from: PatientStatus, to: PatientStatus) -> DispatchError {
    DispatchError::InvalidTransition {
        entity: EntityKind::Patient,
        from: from.to_string(),
        to: to.to_string(),
    }
}

fn refuse_ambulance(from: AmbulanceStatus, to: AmbulanceStatus) -> DispatchError {
    DispatchError::InvalidTransition {
        entity: EntityKind::Ambulance,
        from: from.to_string(),
        to: to.to_string(),
    }
}

fn advance_patient(patient: &mut Patient, next: PatientStatus) -> Result<(), DispatchError> {
    if !patient.status.can_advance_to(next) {
        return Err(refuse_patient(patient.status, next));
    }
    patient.status = next;
    Ok(())
}

fn check_ambulance(ambulance: &Ambulance, next: AmbulanceStatus) -> Result<(), DispatchError> {
    if ambulance.status.can_advance_to(next) {
        Ok(())
    } else {
        Err(refuse_ambulance(ambulance.status, next))
    }
}

/// `WAITING -> PICKUP`, recording the assignment.
pub fn assign_patient(
    patient: &mut Patient,
    ambulance: AmbulanceId,
    hospital: HospitalId,
    eta_seconds: u64,
) -> Result<(), DispatchError> {
    advance_patient(patient, PatientStatus::Pickup)?;
    patient.ambulance_id = Some(ambulance);
    patient.hospital_id = Some(hospital);
    patient.eta_seconds = Some(eta_seconds);
    Ok(())
}

/// `PICKUP -> TO_HOSPITAL`.
pub fn board_patient(patient: &mut Patient) -> Result<(), DispatchError> {
    advance_patient(patient, PatientStatus::ToHospital)
}

/// `TO_HOSPITAL -> COMPLETED`.
pub fn deliver_patient(patient: &mut Patient) -> Result<(), DispatchError> {
    advance_patient(patient, PatientStatus::Completed)
}

/// Administrative close: any non-terminal status to `COMPLETED`.
pub fn close_patient(patient: &mut Patient) -> Result<(), DispatchError> {
    if patient.status.is_terminal() {
        return Err(refuse_patient(patient.status, PatientStatus::Completed));
    }
    patient.status = PatientStatus::Completed;
    Ok(())
}

/// `AVAILABLE -> ASSIGNED`, heading for the patient.
pub fn assign_ambulance(
    ambulance: &mut Ambulance,
    patient: PatientId,
    pickup: Location,
) -> Result<(), DispatchError> {
    check_ambulance(ambulance, AmbulanceStatus::Assigned)?;
    ambulance.status = AmbulanceStatus::Assigned;
    ambulance.current_patient = Some(patient);
    ambulance.target = Some(pickup);
    Ok(())
}

/// `ASSIGNED -> TO_HOSPITAL`, retargeted at the hospital.
pub fn retarget_to_hospital(
    ambulance: &mut Ambulance,
    hospital: Location,
) -> Result<(), DispatchError> {
    check_ambulance(ambulance, AmbulanceStatus::ToHospital)?;
    ambulance.status = AmbulanceStatus::ToHospital;
    ambulance.target = Some(hospital);
    Ok(())
}

/// `TO_HOSPITAL -> COMPLETED`, dropping the patient and target.
pub fn complete_ambulance(ambulance: &mut Ambulance) -> Result<(), DispatchError> {
    check_ambulance(ambulance, AmbulanceStatus::Completed)?;
    ambulance.status = AmbulanceStatus::Completed;
    ambulance.current_patient = None;
    ambulance.target = None;
    Ok(())
}

/// Return an ambulance to the pool.
///
/// This is the only backward move in either state machine.
pub fn release_ambulance(ambulance: &mut Ambulance) {
    ambulance.status = AmbulanceStatus::Available;
    ambulance.current_patient = None;
    ambulance.target = None;
}
