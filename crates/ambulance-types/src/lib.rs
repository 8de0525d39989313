//! Shared type definitions for the ambulance dispatch engine.
//!
//! Every crate in the workspace speaks in these types, and the live-map
//! clients receive them as `TypeScript` bindings generated by `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for patients, ambulances, hospitals
//! - [`enums`] -- Lifecycle statuses and log levels
//! - [`structs`] -- Entity records, the intake payload, and read models

pub mod enums;
pub mod ids;
pub mod structs;

pub use enums::{AmbulanceStatus, LogLevel, PatientStatus};
pub use ids::{AmbulanceId, HospitalId, PatientId};
pub use structs::{
    AdminDashboard, Ambulance, EmergencyReceipt, EmergencyRequest, Hospital, Location, LogPage,
    MapState, Patient, PatientStatusView, SystemLogEntry,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        use ts_rs::TS;

        let _ = crate::ids::PatientId::export_all();
        let _ = crate::ids::AmbulanceId::export_all();
        let _ = crate::ids::HospitalId::export_all();

        let _ = crate::enums::PatientStatus::export_all();
        let _ = crate::enums::AmbulanceStatus::export_all();
        let _ = crate::enums::LogLevel::export_all();

        let _ = crate::structs::Location::export_all();
        let _ = crate::structs::Patient::export_all();
        let _ = crate::structs::Ambulance::export_all();
        let _ = crate::structs::Hospital::export_all();
        let _ = crate::structs::SystemLogEntry::export_all();
        let _ = crate::structs::EmergencyRequest::export_all();
        let _ = crate::structs::EmergencyReceipt::export_all();
        let _ = crate::structs::PatientStatusView::export_all();
        let _ = crate::structs::MapState::export_all();
        let _ = crate::structs::AdminDashboard::export_all();
        let _ = crate::structs::LogPage::export_all();
    }
}
