//! Matching, scoring, and movement simulation for the ambulance dispatch
//! engine.
//!
//! Emergency requests are matched to the first idle ambulance and the
//! best-scoring hospital, then a fixed-period tick walks each assigned
//! ambulance to the patient and on to the hospital. All state lives in one
//! [`Store`] owned by the [`DispatchService`] task.
//!
//! # Modules
//!
//! - [`geo`] -- Haversine distance and fixed-step movement toward a target.
//! - [`priority`] -- Condition severity table and hospital scoring.
//! - [`eta`] -- Distance-to-seconds travel estimates.
//! - [`store`] -- Arena storage for patients, ambulances, and hospitals.
//! - [`log`] -- The capped system log behind the admin dashboard.
//! - [`lifecycle`] -- Checked status transitions for both state machines.
//! - [`dispatch`] -- Emergency intake and the dispatch coordinator.
//! - [`movement`] -- The per-tick movement simulator.
//! - [`admin`] -- Release and manual completion.
//! - [`views`] -- Status, map, dashboard, and log read models.
//! - [`config`] -- Configuration loading from `ambulance-config.yaml`.
//! - [`control`] -- Pause, resume, and stop state for the simulator.
//! - [`service`] -- The single-writer service task and its handle.
//!
//! [`Store`]: store::Store
//! [`DispatchService`]: service::DispatchService

pub mod admin;
pub mod config;
pub mod control;
pub mod dispatch;
pub mod error;
pub mod eta;
pub mod geo;
pub mod lifecycle;
pub mod log;
pub mod movement;
pub mod priority;
pub mod service;
pub mod store;
pub mod views;

pub use config::{ConfigError, DispatchConfig};
pub use control::{ServiceEndReason, SimulatorControl, SimulatorStatus};
pub use error::{DispatchError, TickError};
pub use service::{DispatchService, ServiceHandle, ServiceReport};
pub use store::Store;
