//! Administrative overrides: returning ambulances to the pool and closing
//! patients by hand.
//!
//! A delivered ambulance sits in `COMPLETED` until an operator releases it.
//! Ambulances on an active leg are never released directly; closing their
//! patient with [`mark_completed`] releases them as part of the same update.

use ambulance_types::{AmbulanceId, AmbulanceStatus, PatientId};
use tracing::debug;

use crate::error::{DispatchError, EntityKind};
use crate::lifecycle;
use crate::log::LogSink;
use crate::store::Store;

/// Return one `COMPLETED` ambulance to `AVAILABLE`.
///
/// Releasing an ambulance that is already available is a no-op.
///
/// # Errors
///
/// [`DispatchError::AmbulanceNotFound`] for an unknown id, or
/// [`DispatchError::InvalidTransition`] while the ambulance is on a leg.
pub fn release(
    store: &mut Store,
    log: &mut dyn LogSink,
    ambulance_id: AmbulanceId,
) -> Result<(), DispatchError> {
    let ambulance = store
        .ambulances
        .get_mut(ambulance_id)
        .ok_or(DispatchError::AmbulanceNotFound(ambulance_id))?;

    match ambulance.status {
        AmbulanceStatus::Available => Ok(()),
        AmbulanceStatus::Completed => {
            lifecycle::release_ambulance(ambulance);
            log.info(format!("Ambulance {ambulance_id} released"));
            Ok(())
        }
        status => Err(DispatchError::InvalidTransition {
            entity: EntityKind::Ambulance,
            from: status.to_string(),
            to: AmbulanceStatus::Available.to_string(),
        }),
    }
}

/// Release every `COMPLETED` ambulance and return how many were released.
///
/// Ambulances on an active leg are left alone.
pub fn release_all(store: &mut Store, log: &mut dyn LogSink) -> usize {
    let mut released = 0_usize;
    for ambulance in store.ambulances.iter_mut() {
        match ambulance.status {
            AmbulanceStatus::Completed => {
                lifecycle::release_ambulance(ambulance);
                released = released.saturating_add(1);
            }
            status if status.is_in_flight() => {
                debug!(ambulance = %ambulance.id, %status, "Release skipped, ambulance in flight");
            }
            _ => {}
        }
    }
    log.info(format!("All ambulances released ({released} returned to pool)"));
    released
}

/// Close a patient as delivered and free its ambulance.
///
/// The ambulance is released when it is still paired with this patient, or
/// when it is `COMPLETED` and carries nobody. An ambulance that has already
/// moved on to another patient is not touched.
///
/// # Errors
///
/// [`DispatchError::PatientNotFound`] for an unknown id, or
/// [`DispatchError::InvalidTransition`] if the patient is already closed.
pub fn mark_completed(
    store: &mut Store,
    log: &mut dyn LogSink,
    patient_id: PatientId,
) -> Result<(), DispatchError> {
    let mut patient = store
        .patients
        .get(patient_id)
        .cloned()
        .ok_or(DispatchError::PatientNotFound(patient_id))?;
    lifecycle::close_patient(&mut patient)?;

    let ambulance = patient
        .ambulance_id
        .and_then(|id| store.ambulances.get(id))
        .filter(|ambulance| {
            ambulance.current_patient == Some(patient_id)
                || (ambulance.status == AmbulanceStatus::Completed
                    && ambulance.current_patient.is_none())
        })
        .cloned();

    if let Some(mut ambulance) = ambulance {
        lifecycle::release_ambulance(&mut ambulance);
        store.ambulances.save(ambulance);
    }
    store.patients.save(patient);

    log.info(format!(
        "Admin marked patient {patient_id} as reached hospital"
    ));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ambulance_types::{
        Ambulance, EmergencyRequest, Hospital, HospitalId, Location, PatientStatus,
    };

    use super::*;
    use crate::config::SimulationConfig;
    use crate::dispatch;
    use crate::log::SystemLog;
    use crate::movement;

    fn store() -> Store {
        let here = Location::new(12.3456, 74.5678);
        Store::with_fleet(
            [
                Ambulance::available(AmbulanceId::new(), "DRV-1", "John", here),
                Ambulance::available(AmbulanceId::new(), "DRV-2", "Maria", here),
            ],
            [Hospital {
                id: HospitalId::new(),
                name: String::from("City General"),
                location: here,
                general_beds: 10,
                general_beds_available: 10,
                icu_beds: 2,
                icu_beds_available: 2,
            }],
        )
    }

    fn submit(store: &mut Store, log: &mut SystemLog) -> (PatientId, AmbulanceId) {
        let request = EmergencyRequest {
            name: String::from("Meera"),
            age: None,
            condition: String::from("breathing_difficulty"),
            latitude: 12.3456,
            longitude: 74.5678,
        };
        let receipt = dispatch::submit_emergency(store, log, &request, 50.0).unwrap();
        (receipt.patient_id, receipt.ambulance_id)
    }

    fn deliver(store: &mut Store, log: &mut SystemLog) {
        let config = SimulationConfig::default();
        movement::run_tick(store, log, &config, 1);
        movement::run_tick(store, log, &config, 2);
    }

    #[test]
    fn release_returns_completed_ambulance_to_pool() {
        let mut store = store();
        let mut log = SystemLog::default();
        let (_, ambulance_id) = submit(&mut store, &mut log);
        deliver(&mut store, &mut log);
        assert_eq!(
            store.ambulances.get(ambulance_id).unwrap().status,
            AmbulanceStatus::Completed
        );

        release(&mut store, &mut log, ambulance_id).unwrap();
        let ambulance = store.ambulances.get(ambulance_id).unwrap();
        assert_eq!(ambulance.status, AmbulanceStatus::Available);
        assert!(ambulance.target.is_none());
    }

    #[test]
    fn release_refuses_in_flight_ambulance() {
        let mut store = store();
        let mut log = SystemLog::default();
        let (_, ambulance_id) = submit(&mut store, &mut log);
        let err = release(&mut store, &mut log, ambulance_id);
        assert!(matches!(err, Err(DispatchError::InvalidTransition { .. })));
        assert_eq!(
            store.ambulances.get(ambulance_id).unwrap().status,
            AmbulanceStatus::Assigned
        );
    }

    #[test]
    fn release_unknown_ambulance_is_not_found() {
        let mut store = store();
        let mut log = SystemLog::default();
        let missing = AmbulanceId::new();
        assert_eq!(
            release(&mut store, &mut log, missing),
            Err(DispatchError::AmbulanceNotFound(missing))
        );
    }

    #[test]
    fn release_all_counts_only_completed() {
        let mut store = store();
        let mut log = SystemLog::default();
        submit(&mut store, &mut log);
        deliver(&mut store, &mut log);
        let (_, busy) = submit(&mut store, &mut log);

        assert_eq!(release_all(&mut store, &mut log), 1);
        assert_eq!(
            store.ambulances.get(busy).unwrap().status,
            AmbulanceStatus::Assigned
        );
        assert!(store
            .ambulances
            .iter()
            .filter(|a| a.id != busy)
            .all(|a| a.status == AmbulanceStatus::Available));
    }

    #[test]
    fn mark_completed_frees_paired_ambulance() {
        let mut store = store();
        let mut log = SystemLog::default();
        let (patient_id, ambulance_id) = submit(&mut store, &mut log);

        mark_completed(&mut store, &mut log, patient_id).unwrap();
        assert_eq!(
            store.patients.get(patient_id).unwrap().status,
            PatientStatus::Completed
        );
        let ambulance = store.ambulances.get(ambulance_id).unwrap();
        assert_eq!(ambulance.status, AmbulanceStatus::Available);
        assert!(ambulance.current_patient.is_none());
    }

    #[test]
    fn mark_completed_leaves_reassigned_ambulance_alone() {
        let mut store = store();
        let mut log = SystemLog::default();
        let (first_patient, ambulance_id) = submit(&mut store, &mut log);
        deliver(&mut store, &mut log);
        release(&mut store, &mut log, ambulance_id).unwrap();
        let (second_patient, again) = submit(&mut store, &mut log);
        assert_eq!(again, ambulance_id);

        // The first patient is already closed by delivery.
        assert!(mark_completed(&mut store, &mut log, first_patient).is_err());
        let ambulance = store.ambulances.get(ambulance_id).unwrap();
        assert_eq!(ambulance.current_patient, Some(second_patient));
    }

    #[test]
    fn mark_completed_unknown_patient() {
        let mut store = store();
        let mut log = SystemLog::default();
        let missing = PatientId::new();
        assert_eq!(
            mark_completed(&mut store, &mut log, missing),
            Err(DispatchError::PatientNotFound(missing))
        );
    }
}
