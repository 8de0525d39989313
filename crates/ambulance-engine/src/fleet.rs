//! Builds the initial [`Store`] from the configured fleet roster.
//!
//! Roster entries may pin an id; unpinned entries get a fresh one. Entries
//! are loaded in file order, which becomes the dispatch preference order
//! for ambulances and the tie-break order for hospitals.

use std::collections::BTreeSet;

use ambulance_core::Store;
use ambulance_core::config::{AmbulanceSpec, FleetConfig, HospitalSpec};
use ambulance_types::{Ambulance, AmbulanceId, Hospital, HospitalId, Location};
use tracing::info;

use crate::error::EngineError;

/// Build a store holding every ambulance and hospital in the roster.
///
/// # Errors
///
/// Returns [`EngineError::Fleet`] for an entry with an invalid location, a
/// blank name, more free beds than beds, or a repeated pinned id.
pub fn build_store(fleet: &FleetConfig) -> Result<Store, EngineError> {
    let mut ambulance_ids = BTreeSet::new();
    let mut ambulances = Vec::with_capacity(fleet.ambulances.len());
    for spec in &fleet.ambulances {
        let ambulance = ambulance_from_spec(spec)?;
        if !ambulance_ids.insert(ambulance.id) {
            return Err(rejected(format!("duplicate ambulance id {}", ambulance.id)));
        }
        ambulances.push(ambulance);
    }

    let mut hospital_ids = BTreeSet::new();
    let mut hospitals = Vec::with_capacity(fleet.hospitals.len());
    for spec in &fleet.hospitals {
        let hospital = hospital_from_spec(spec)?;
        if !hospital_ids.insert(hospital.id) {
            return Err(rejected(format!("duplicate hospital id {}", hospital.id)));
        }
        hospitals.push(hospital);
    }

    info!(
        ambulances = ambulances.len(),
        hospitals = hospitals.len(),
        "Fleet loaded"
    );
    Ok(Store::with_fleet(ambulances, hospitals))
}

fn ambulance_from_spec(spec: &AmbulanceSpec) -> Result<Ambulance, EngineError> {
    if spec.driver_id.trim().is_empty() || spec.driver_name.trim().is_empty() {
        return Err(rejected(String::from(
            "ambulance entries need a driver_id and driver_name",
        )));
    }
    let location = checked_location(&spec.driver_id, spec.lat, spec.lng)?;
    let id = spec.id.map_or_else(AmbulanceId::new, AmbulanceId::from);
    Ok(Ambulance::available(
        id,
        spec.driver_id.as_str(),
        spec.driver_name.as_str(),
        location,
    ))
}

fn hospital_from_spec(spec: &HospitalSpec) -> Result<Hospital, EngineError> {
    if spec.name.trim().is_empty() {
        return Err(rejected(String::from("hospital entries need a name")));
    }
    let location = checked_location(&spec.name, spec.lat, spec.lng)?;

    let general_beds_available = spec.general_beds_available.unwrap_or(spec.general_beds);
    let icu_beds_available = spec.icu_beds_available.unwrap_or(spec.icu_beds);
    if general_beds_available > spec.general_beds || icu_beds_available > spec.icu_beds {
        return Err(rejected(format!(
            "hospital {} lists more free beds than beds",
            spec.name
        )));
    }

    Ok(Hospital {
        id: spec.id.map_or_else(HospitalId::new, HospitalId::from),
        name: spec.name.clone(),
        location,
        general_beds: spec.general_beds,
        general_beds_available,
        icu_beds: spec.icu_beds,
        icu_beds_available,
    })
}

fn checked_location(label: &str, lat: f64, lng: f64) -> Result<Location, EngineError> {
    let location = Location::new(lat, lng);
    if location.is_valid() {
        Ok(location)
    } else {
        Err(rejected(format!("{label} has invalid location {location}")))
    }
}

const fn rejected(message: String) -> EngineError {
    EngineError::Fleet { message }
}
