//! Simulator control state shared between the dispatch service and its
//! handles.
//!
//! Pausing stops the movement ticks while dispatch, admin, and query
//! commands keep being served. A stop request ends the service loop at the
//! next opportunity. All fields are atomics so handles never wait on the
//! service task to read them.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

/// Reason why the dispatch service ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceEndReason {
    /// A shutdown was requested through a handle or the control.
    OperatorStop,
    /// Every handle was dropped.
    HandlesClosed,
}

/// Shared simulator control state.
#[derive(Debug)]
pub struct SimulatorControl {
    /// Whether movement ticks are suspended.
    paused: AtomicBool,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Wakes the service loop when a stop is requested.
    stop_notify: Notify,

    /// Ticks executed so far. Paused ticks are not counted.
    ticks: AtomicU64,

    /// Wall-clock time when the control was created.
    started_at: DateTime<Utc>,
}

impl SimulatorControl {
    /// Create a running, unpaused control.
    pub fn new() -> Self {
        Self {
            paused: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            stop_notify: Notify::new(),
            ticks: AtomicU64::new(0),
            started_at: Utc::now(),
        }
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Check whether movement ticks are suspended.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Suspend movement ticks.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume movement ticks.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean stop and wake the service loop.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.stop_notify.notify_one();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Resolve once a stop has been requested.
    pub async fn stopped(&self) {
        while !self.is_stop_requested() {
            self.stop_notify.notified().await;
        }
    }

    // -----------------------------------------------------------------------
    // Ticks
    // -----------------------------------------------------------------------

    /// Ticks executed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Count one executed tick and return its number.
    pub(crate) fn next_tick(&self) -> u64 {
        self.ticks.fetch_add(1, Ordering::AcqRel).saturating_add(1)
    }

    /// Return the wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Return elapsed seconds since start.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Snapshot for status endpoints and logs.
    pub fn status(&self) -> SimulatorStatus {
        SimulatorStatus {
            ticks: self.ticks(),
            paused: self.is_paused(),
            stop_requested: self.is_stop_requested(),
            elapsed_seconds: self.elapsed_seconds(),
            started_at: self.started_at.to_rfc3339(),
        }
    }
}

impl Default for SimulatorControl {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON-serializable simulator status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatorStatus {
    /// Ticks executed so far.
    pub ticks: u64,
    /// Whether movement ticks are suspended.
    pub paused: bool,
    /// Whether a stop has been requested.
    pub stop_requested: bool,
    /// Elapsed wall-clock seconds since start.
    pub elapsed_seconds: u64,
    /// ISO 8601 timestamp of when the service started.
    pub started_at: String,
}
