//! Read-model assembly for status pages, the live map, and the admin
//! dashboard. Nothing here writes to the store.

use ambulance_types::{
    AdminDashboard, LogPage, MapState, Patient, PatientId, PatientStatus, PatientStatusView,
};

use crate::error::DispatchError;
use crate::eta;
use crate::log::SystemLog;
use crate::store::Store;

/// Status of one patient joined with its ambulance and hospital.
///
/// # Errors
///
/// [`DispatchError::PatientNotFound`] for an unknown id.
pub fn status_view(
    store: &Store,
    patient_id: PatientId,
    speed_kmh: f64,
) -> Result<PatientStatusView, DispatchError> {
    store
        .patients
        .get(patient_id)
        .map(|patient| describe(store, patient, speed_kmh))
        .ok_or(DispatchError::PatientNotFound(patient_id))
}

/// Snapshot for polling map clients.
///
/// The active patient is the earliest admitted patient that is not yet
/// `COMPLETED`.
pub fn map_state(store: &Store, speed_kmh: f64) -> MapState {
    let active_patient = store
        .patients
        .iter()
        .find(|patient| patient.status != PatientStatus::Completed)
        .map(|patient| describe(store, patient, speed_kmh));

    MapState {
        active_patient,
        ambulances: store.ambulances.list(),
        hospitals: store.hospitals.list(),
    }
}

/// Map snapshot plus the newest `log_limit` audit entries.
pub fn dashboard(
    store: &Store,
    log: &SystemLog,
    speed_kmh: f64,
    log_limit: usize,
) -> AdminDashboard {
    AdminDashboard {
        map: map_state(store, speed_kmh),
        logs: log.recent(log_limit),
    }
}

/// The newest `limit` audit entries and the retained total.
pub fn log_page(log: &SystemLog, limit: usize) -> LogPage {
    LogPage {
        logs: log.recent(limit),
        total: log.len(),
    }
}

fn describe(store: &Store, patient: &Patient, speed_kmh: f64) -> PatientStatusView {
    let ambulance = patient
        .ambulance_id
        .and_then(|id| store.ambulances.get(id));
    let hospital = patient.hospital_id.and_then(|id| store.hospitals.get(id));

    // ETA to whichever leg is under way.
    let ambulance_eta_seconds = ambulance.and_then(|ambulance| {
        let destination = match patient.status {
            PatientStatus::Pickup => Some(patient.location),
            PatientStatus::ToHospital => hospital.map(|hospital| hospital.location),
            _ => None,
        }?;
        Some(eta::eta_seconds(ambulance.location, destination, speed_kmh))
    });

    PatientStatusView {
        patient_id: patient.id,
        name: patient.name.clone(),
        age: patient.age,
        condition: patient.condition.clone(),
        status: patient.status,
        location: patient.location,
        ambulance_location: ambulance.map(|ambulance| ambulance.location),
        ambulance_eta_seconds,
        hospital_location: hospital.map(|hospital| hospital.location),
        hospital_name: hospital.map(|hospital| hospital.name.clone()),
    }
}
