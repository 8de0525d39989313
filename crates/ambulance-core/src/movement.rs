//! The movement simulator: one tick advances every active ambulance.
//!
//! For each ambulance that is not `AVAILABLE` and has a target, in fleet
//! order:
//!
//! - **Still travelling** -- move one step toward the target.
//! - **Arrived at the patient** (patient `PICKUP`) -- ambulance becomes
//!   `TO_HOSPITAL` and is retargeted at the hospital; patient becomes
//!   `TO_HOSPITAL`.
//! - **Arrived at the hospital** (patient `TO_HOSPITAL`) -- both become
//!   `COMPLETED`; the ambulance drops its patient and target and waits for
//!   an operator release.
//!
//! Each ambulance is written back before the next one is looked at. A fault
//! on one ambulance is logged at error level and the tick carries on.

use ambulance_types::{AmbulanceId, AmbulanceStatus, PatientStatus};
use tracing::{debug, warn};

use crate::config::SimulationConfig;
use crate::error::TickError;
use crate::geo;
use crate::lifecycle;
use crate::log::LogSink;
use crate::store::Store;

/// What happened to one ambulance during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Not active; nothing to do.
    Idle,
    /// Moved one step toward its target.
    Moved,
    /// Reached the patient and turned toward the hospital.
    PickedUp,
    /// Reached the hospital.
    Delivered,
}

/// Counts from one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick number.
    pub tick: u64,
    /// Ambulances that moved.
    pub moved: u32,
    /// Pickups completed.
    pub picked_up: u32,
    /// Deliveries completed.
    pub delivered: u32,
    /// Ambulances that faulted and were skipped.
    pub faults: u32,
}

impl TickSummary {
    /// Whether nothing moved, arrived, or faulted.
    pub const fn is_quiet(&self) -> bool {
        self.moved == 0 && self.picked_up == 0 && self.delivered == 0 && self.faults == 0
    }

    fn record(&mut self, outcome: StepOutcome) {
        let counter = match outcome {
            StepOutcome::Idle => return,
            StepOutcome::Moved => &mut self.moved,
            StepOutcome::PickedUp => &mut self.picked_up,
            StepOutcome::Delivered => &mut self.delivered,
        };
        *counter = counter.saturating_add(1);
    }
}

/// Run one tick over the whole fleet.
pub fn run_tick(
    store: &mut Store,
    log: &mut dyn LogSink,
    config: &SimulationConfig,
    tick: u64,
) -> TickSummary {
    let mut summary = TickSummary {
        tick,
        ..TickSummary::default()
    };

    for ambulance_id in store.ambulances.ids() {
        match advance_ambulance(store, log, ambulance_id, config) {
            Ok(outcome) => summary.record(outcome),
            Err(err) => {
                summary.faults = summary.faults.saturating_add(1);
                warn!(tick, ambulance = %ambulance_id, error = %err, "Ambulance skipped this tick");
                log.error(format!("Tick {tick}: ambulance {ambulance_id} faulted: {err}"));
            }
        }
    }

    if !summary.is_quiet() {
        debug!(
            tick,
            moved = summary.moved,
            picked_up = summary.picked_up,
            delivered = summary.delivered,
            faults = summary.faults,
            "Tick complete"
        );
    }
    summary
}

/// Advance a single ambulance by one tick.
///
/// # Errors
///
/// Returns a [`TickError`] when the ambulance has arrived but its patient
/// or hospital cannot be resolved, or the pair is not in a state that
/// allows the next transition. The store is left unchanged in that case.
pub fn advance_ambulance(
    store: &mut Store,
    log: &mut dyn LogSink,
    ambulance_id: AmbulanceId,
    config: &SimulationConfig,
) -> Result<StepOutcome, TickError> {
    let Some(ambulance) = store.ambulances.get_mut(ambulance_id) else {
        return Ok(StepOutcome::Idle);
    };
    if ambulance.status == AmbulanceStatus::Available {
        return Ok(StepOutcome::Idle);
    }
    let Some(target) = ambulance.target else {
        return Ok(StepOutcome::Idle);
    };

    if geo::distance_km(ambulance.location, target) >= config.arrival_epsilon_km {
        ambulance.location = geo::step_toward(
            ambulance.location,
            target,
            config.step_degrees,
            config.arrival_epsilon_km,
        );
        return Ok(StepOutcome::Moved);
    }

    arrive(store, log, ambulance_id)
}

fn arrive(
    store: &mut Store,
    log: &mut dyn LogSink,
    ambulance_id: AmbulanceId,
) -> Result<StepOutcome, TickError> {
    let Some(mut ambulance) = store.ambulances.get(ambulance_id).cloned() else {
        return Ok(StepOutcome::Idle);
    };
    let patient_id = ambulance
        .current_patient
        .ok_or(TickError::MissingPatientLink(ambulance_id))?;
    let mut patient = store
        .patients
        .get(patient_id)
        .cloned()
        .ok_or(TickError::PatientNotFound {
            ambulance: ambulance_id,
            patient: patient_id,
        })?;
    if patient.ambulance_id != Some(ambulance_id) {
        return Err(TickError::PairingMismatch {
            ambulance: ambulance_id,
            patient: patient_id,
        });
    }

    let outcome = match patient.status {
        PatientStatus::Pickup => {
            let hospital = patient
                .hospital_id
                .and_then(|id| store.hospitals.get(id))
                .map(|hospital| hospital.location)
                .ok_or(TickError::HospitalNotFound {
                    patient: patient_id,
                })?;
            lifecycle::retarget_to_hospital(&mut ambulance, hospital)?;
            lifecycle::board_patient(&mut patient)?;
            log.info(format!(
                "Ambulance {ambulance_id} picked up patient {patient_id}"
            ));
            StepOutcome::PickedUp
        }
        PatientStatus::ToHospital => {
            lifecycle::complete_ambulance(&mut ambulance)?;
            lifecycle::deliver_patient(&mut patient)?;
            log.info(format!(
                "Ambulance {ambulance_id} reached hospital with patient {patient_id}"
            ));
            StepOutcome::Delivered
        }
        status => {
            return Err(TickError::UnexpectedPatientStatus {
                patient: patient_id,
                status,
            });
        }
    };

    store.ambulances.save(ambulance);
    store.patients.save(patient);
    Ok(outcome)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ambulance_types::{Ambulance, Hospital, HospitalId, Location, Patient, PatientId};
    use chrono::Utc;

    use super::*;
    use crate::log::SystemLog;

    struct Scenario {
        store: Store,
        log: SystemLog,
        config: SimulationConfig,
        ambulance: AmbulanceId,
        patient: PatientId,
        hospital: Location,
    }

    impl Scenario {
        /// An ambulance `ASSIGNED` to a `PICKUP` patient, as dispatch leaves it.
        fn assigned(start: Location, pickup: Location, hospital: Location) -> Self {
            let hospital_record = Hospital {
                id: HospitalId::new(),
                name: String::from("City General"),
                location: hospital,
                general_beds: 100,
                general_beds_available: 90,
                icu_beds: 20,
                icu_beds_available: 5,
            };
            let mut ambulance = Ambulance::available(AmbulanceId::new(), "DRV-001", "John", start);
            let mut patient = Patient {
                id: PatientId::new(),
                name: String::from("Anil"),
                age: Some(70),
                condition: String::from("cardiac"),
                status: PatientStatus::Waiting,
                location: pickup,
                created_at: Utc::now(),
                ambulance_id: None,
                hospital_id: None,
                eta_seconds: None,
            };
            lifecycle::assign_ambulance(&mut ambulance, patient.id, pickup).unwrap();
            lifecycle::assign_patient(&mut patient, ambulance.id, hospital_record.id, 1).unwrap();

            let ambulance_id = ambulance.id;
            let patient_id = patient.id;
            let mut store = Store::with_fleet([ambulance], [hospital_record]);
            store.patients.save(patient);
            Self {
                store,
                log: SystemLog::default(),
                config: SimulationConfig::default(),
                ambulance: ambulance_id,
                patient: patient_id,
                hospital,
            }
        }

        fn tick(&mut self, n: u64) -> TickSummary {
            run_tick(&mut self.store, &mut self.log, &self.config, n)
        }

        fn ambulance(&self) -> &Ambulance {
            self.store.ambulances.get(self.ambulance).unwrap()
        }

        fn patient(&self) -> &Patient {
            self.store.patients.get(self.patient).unwrap()
        }
    }

    #[test]
    fn short_hop_arrives_in_one_tick_then_picks_up() {
        let pickup = Location::new(12.3456, 74.5679);
        let mut s = Scenario::assigned(
            Location::new(12.3456, 74.5678),
            pickup,
            Location::new(12.35, 74.59),
        );

        let first = s.tick(1);
        assert_eq!(first.moved, 1);
        assert_eq!(s.ambulance().location, pickup);
        assert_eq!(s.patient().status, PatientStatus::Pickup);

        let second = s.tick(2);
        assert_eq!(second.picked_up, 1);
        assert_eq!(s.ambulance().status, AmbulanceStatus::ToHospital);
        assert_eq!(s.ambulance().target, Some(s.hospital));
        assert_eq!(s.patient().status, PatientStatus::ToHospital);
    }

    #[test]
    fn full_run_delivers_and_waits_for_release() {
        let start = Location::new(12.3456, 74.5678);
        let mut s = Scenario::assigned(
            start,
            Location::new(12.3466, 74.5678),
            Location::new(12.3500, 74.5700),
        );

        let mut tick = 0_u64;
        while s.patient().status != PatientStatus::Completed {
            tick += 1;
            let summary = s.tick(tick);
            assert_eq!(summary.faults, 0);
            assert!(tick < 200, "simulation did not converge");
        }

        let ambulance = s.ambulance();
        assert_eq!(ambulance.status, AmbulanceStatus::Completed);
        assert_eq!(ambulance.location, s.hospital);
        assert!(ambulance.current_patient.is_none());
        assert!(ambulance.target.is_none());

        let messages: Vec<_> = s.log.recent(10).into_iter().map(|e| e.message).collect();
        assert!(messages.iter().any(|m| m.contains("picked up")));
        assert!(messages.iter().any(|m| m.contains("reached hospital")));
    }

    #[test]
    fn ticks_after_completion_are_idempotent() {
        let here = Location::new(12.3456, 74.5678);
        let mut s = Scenario::assigned(here, here, here);

        assert_eq!(s.tick(1).picked_up, 1);
        assert_eq!(s.tick(2).delivered, 1);
        let settled = (s.ambulance().clone(), s.patient().clone());
        for n in 3..10 {
            assert_eq!(s.tick(n), TickSummary { tick: n, ..TickSummary::default() });
        }
        assert_eq!((s.ambulance().clone(), s.patient().clone()), settled);
    }

    #[test]
    fn state_advances_at_most_once_per_tick() {
        let here = Location::new(12.3456, 74.5678);
        let mut s = Scenario::assigned(here, here, here);
        s.tick(1);
        // Already at the hospital, but delivery waits for the next tick.
        assert_eq!(s.patient().status, PatientStatus::ToHospital);
        assert_eq!(s.ambulance().status, AmbulanceStatus::ToHospital);
    }

    #[test]
    fn available_ambulances_do_not_move() {
        let here = Location::new(12.3456, 74.5678);
        let idle = Ambulance::available(AmbulanceId::new(), "DRV-9", "Idle", here);
        let idle_id = idle.id;
        let mut store = Store::with_fleet([idle], []);
        let mut log = SystemLog::default();
        let summary = run_tick(&mut store, &mut log, &SimulationConfig::default(), 1);
        assert_eq!(summary.moved, 0);
        assert_eq!(store.ambulances.get(idle_id).unwrap().location, here);
    }

    #[test]
    fn fault_on_one_ambulance_does_not_stop_the_others() {
        let here = Location::new(12.3456, 74.5678);
        let mut s = Scenario::assigned(here, Location::new(12.3556, 74.5678), here);

        // A second ambulance at its target whose patient record is missing.
        let mut orphan = Ambulance::available(AmbulanceId::new(), "DRV-2", "Orphan", here);
        lifecycle::assign_ambulance(&mut orphan, PatientId::new(), here).unwrap();
        let orphan_id = orphan.id;
        s.store.ambulances.save(orphan);

        let summary = s.tick(1);
        assert_eq!(summary.faults, 1);
        assert_eq!(summary.moved, 1);
        assert_eq!(
            s.store.ambulances.get(orphan_id).unwrap().status,
            AmbulanceStatus::Assigned
        );
        let last = s.log.recent(1);
        assert_eq!(last.first().map(|e| e.level), Some(ambulance_types::LogLevel::Error));

        // The next tick runs as usual.
        assert_eq!(s.tick(2).moved, 1);
    }

    #[test]
    fn completed_patient_on_arrival_is_a_fault() {
        let here = Location::new(12.3456, 74.5678);
        let mut s = Scenario::assigned(here, here, here);
        let patient = s.store.patients.get_mut(s.patient).unwrap();
        patient.status = PatientStatus::Completed;

        let err = advance_ambulance(&mut s.store, &mut s.log, s.ambulance, &s.config);
        assert!(matches!(
            err,
            Err(TickError::UnexpectedPatientStatus {
                status: PatientStatus::Completed,
                ..
            })
        ));
    }

    #[test]
    fn missing_hospital_is_a_fault_and_changes_nothing() {
        let here = Location::new(12.3456, 74.5678);
        let mut s = Scenario::assigned(here, here, here);
        s.store.hospitals = crate::store::Arena::new();
        let before = (s.ambulance().clone(), s.patient().clone());

        let err = advance_ambulance(&mut s.store, &mut s.log, s.ambulance, &s.config);
        assert!(matches!(err, Err(TickError::HospitalNotFound { .. })));
        assert_eq!((s.ambulance().clone(), s.patient().clone()), before);
    }
}
