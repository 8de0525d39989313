//! Integration tests for the dispatch service.
//!
//! Tests drive the service only through [`ServiceHandle`], with tokio's
//! paused clock standing in for real time so a full pickup-and-delivery
//! run completes instantly.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use ambulance_core::config::DispatchConfig;
use ambulance_core::{DispatchError, DispatchService, ServiceEndReason, ServiceHandle, Store};
use ambulance_types::{
    Ambulance, AmbulanceId, AmbulanceStatus, EmergencyRequest, Hospital, HospitalId, LogLevel,
    Location, PatientId, PatientStatus,
};

const BASE: Location = Location::new(12.3456, 74.5678);

fn ambulance(driver: &str) -> Ambulance {
    Ambulance::available(AmbulanceId::new(), format!("DRV-{driver}"), driver, BASE)
}

fn hospital(name: &str, lat: f64, lng: f64, icu: u32) -> Hospital {
    Hospital {
        id: HospitalId::new(),
        name: name.to_owned(),
        location: Location::new(lat, lng),
        general_beds: 20,
        general_beds_available: 20,
        icu_beds: icu,
        icu_beds_available: icu,
    }
}

fn request(name: &str, condition: &str) -> EmergencyRequest {
    EmergencyRequest {
        name: name.to_owned(),
        age: Some(58),
        condition: condition.to_owned(),
        latitude: 12.3466,
        longitude: 74.5688,
    }
}

fn start(ambulances: Vec<Ambulance>, hospitals: Vec<Hospital>) -> ServiceHandle {
    let (handle, _task) =
        DispatchService::spawn(Store::with_fleet(ambulances, hospitals), &DispatchConfig::default());
    handle
}

async fn wait_for_status(handle: &ServiceHandle, patient: PatientId, want: PatientStatus) {
    for _ in 0..600 {
        if handle.status(patient).await.unwrap().status == want {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1000)).await;
    }
    panic!("patient never reached {want}");
}

#[tokio::test(start_paused = true)]
async fn full_run_from_intake_to_release() {
    let general = hospital("City General", 12.3486, 74.5708, 2);
    let handle = start(vec![ambulance("John")], vec![general.clone()]);

    let receipt = handle
        .submit_emergency(request("Asha", "chest pain"))
        .await
        .unwrap();
    assert_eq!(receipt.hospital_id, general.id);
    assert!(receipt.eta_seconds >= 1);

    let view = handle.status(receipt.patient_id).await.unwrap();
    assert_eq!(view.status, PatientStatus::Pickup);
    assert_eq!(view.hospital_name.as_deref(), Some("City General"));

    wait_for_status(&handle, receipt.patient_id, PatientStatus::ToHospital).await;
    let carrying = handle.ambulance(receipt.ambulance_id).await.unwrap();
    assert_eq!(carrying.status, AmbulanceStatus::ToHospital);
    assert_eq!(carrying.target, Some(general.location));

    wait_for_status(&handle, receipt.patient_id, PatientStatus::Completed).await;
    let parked = handle.ambulance(receipt.ambulance_id).await.unwrap();
    assert_eq!(parked.status, AmbulanceStatus::Completed);
    assert!(parked.current_patient.is_none());

    // Completed ambulances stay out of the pool until released.
    let blocked = handle.submit_emergency(request("Dev", "fever")).await;
    assert!(matches!(blocked, Err(DispatchError::ResourceUnavailable { .. })));

    assert_eq!(handle.release_all().await.unwrap(), 1);
    let free = handle.ambulance(receipt.ambulance_id).await.unwrap();
    assert_eq!(free.status, AmbulanceStatus::Available);

    let messages: Vec<String> = handle
        .logs(100)
        .await
        .unwrap()
        .logs
        .into_iter()
        .map(|entry| entry.message)
        .collect();
    assert!(messages.iter().any(|m| m.starts_with("New emergency request: Asha")));
    assert!(messages.iter().any(|m| m.contains("picked up patient")));
    assert!(messages.iter().any(|m| m.contains("reached hospital")));
    assert!(messages.iter().any(|m| m.starts_with("All ambulances released")));
}

#[tokio::test(start_paused = true)]
async fn waiting_patient_can_be_dispatched_later() {
    let handle = start(
        vec![ambulance("John")],
        vec![hospital("City General", 12.3486, 74.5708, 2)],
    );
    let first = handle.submit_emergency(request("Asha", "burn")).await.unwrap();

    let err = handle.submit_emergency(request("Dev", "fracture")).await;
    assert!(matches!(err, Err(DispatchError::ResourceUnavailable { .. })));
    let waiting = handle
        .map_state()
        .await
        .unwrap()
        .active_patient
        .map(|view| view.patient_id);
    assert_eq!(waiting, Some(first.patient_id));

    handle.mark_completed(first.patient_id).await.unwrap();
    let map = handle.map_state().await.unwrap();
    let dev = map.active_patient.unwrap();
    assert_eq!(dev.name, "Dev");
    assert_eq!(dev.status, PatientStatus::Waiting);

    let assignment = handle.dispatch_patient(dev.patient_id).await.unwrap();
    assert_eq!(assignment.ambulance_id, first.ambulance_id);
    assert_eq!(
        handle.status(dev.patient_id).await.unwrap().status,
        PatientStatus::Pickup
    );

    let warnings = handle
        .dashboard()
        .await
        .unwrap()
        .logs
        .into_iter()
        .filter(|entry| entry.level == LogLevel::Warning)
        .count();
    assert_eq!(warnings, 1);
}

#[tokio::test(start_paused = true)]
async fn critical_patient_goes_to_hospital_with_icu() {
    // Near hospital ~2 km away without ICU or beds, far one ~5 km with both.
    let mut near = hospital("Clinic", 12.3646, 74.5678, 0);
    near.general_beds_available = 0;
    let far = hospital("Regional", 12.3916, 74.5678, 4);
    let handle = start(vec![ambulance("John")], vec![near, far.clone()]);

    let receipt = handle
        .submit_emergency(request("Lena", "Cardiac arrest"))
        .await
        .unwrap();
    assert_eq!(receipt.hospital_id, far.id);
}

#[tokio::test(start_paused = true)]
async fn concurrent_submissions_never_share_an_ambulance() {
    let handle = start(
        vec![ambulance("John"), ambulance("Maria"), ambulance("Ali")],
        vec![hospital("City General", 12.3486, 74.5708, 2)],
    );

    let mut tasks = Vec::new();
    for n in 0..5 {
        let handle = handle.clone();
        tasks.push(tokio::spawn(async move {
            handle
                .submit_emergency(request(&format!("Caller {n}"), "stroke"))
                .await
        }));
    }

    let mut assigned = Vec::new();
    let mut refused = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(receipt) => assigned.push(receipt.ambulance_id),
            Err(DispatchError::ResourceUnavailable { .. }) => refused += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assigned.sort();
    assigned.dedup();
    assert_eq!(assigned.len(), 3);
    assert_eq!(refused, 2);

    let busy = handle
        .ambulances()
        .await
        .unwrap()
        .into_iter()
        .filter(|a| a.status == AmbulanceStatus::Assigned)
        .count();
    assert_eq!(busy, 3);
}

#[tokio::test(start_paused = true)]
async fn pause_freezes_ambulances() {
    let handle = start(
        vec![ambulance("John")],
        vec![hospital("City General", 12.3486, 74.5708, 2)],
    );
    handle.pause();
    let receipt = handle.submit_emergency(request("Asha", "bleeding")).await.unwrap();

    tokio::time::sleep(Duration::from_secs(30)).await;
    let still = handle.ambulance(receipt.ambulance_id).await.unwrap();
    assert_eq!(still.location, BASE);
    assert_eq!(handle.ticks(), 0);
    assert!(handle.simulator_status().paused);

    handle.resume();
    wait_for_status(&handle, receipt.patient_id, PatientStatus::Completed).await;
}

#[tokio::test]
async fn validation_errors_leave_no_patient_behind() {
    let handle = start(vec![ambulance("John")], Vec::new());

    let mut blank = request("Asha", "   ");
    let err = handle.submit_emergency(blank.clone()).await;
    assert!(matches!(err, Err(DispatchError::Validation { .. })));

    blank.condition = String::from("fever");
    blank.latitude = 123.0;
    let err = handle.submit_emergency(blank).await;
    assert!(matches!(err, Err(DispatchError::Validation { .. })));

    assert!(handle.map_state().await.unwrap().active_patient.is_none());
    assert_eq!(handle.logs(10).await.unwrap().total, 0);
}

#[tokio::test]
async fn lookups_report_missing_records() {
    let handle = start(Vec::new(), Vec::new());
    let ambulance = AmbulanceId::new();
    let hospital = HospitalId::new();

    assert_eq!(
        handle.ambulance(ambulance).await,
        Err(DispatchError::AmbulanceNotFound(ambulance))
    );
    assert_eq!(
        handle.hospital(hospital).await,
        Err(DispatchError::HospitalNotFound(hospital))
    );
    assert_eq!(
        handle.release(ambulance).await,
        Err(DispatchError::AmbulanceNotFound(ambulance))
    );
}

#[tokio::test]
async fn shutdown_reports_operator_stop() {
    let (handle, task) = DispatchService::spawn(Store::new(), &DispatchConfig::default());
    assert!(handle.hospitals().await.unwrap().is_empty());
    handle.shutdown();
    let report = task.await.unwrap();
    assert_eq!(report.end_reason, ServiceEndReason::OperatorStop);
    assert_eq!(
        handle.release_all().await,
        Err(DispatchError::ServiceUnavailable)
    );
}
