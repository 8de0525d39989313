//! The dispatch service: a single task that owns the [`Store`] and the
//! [`SystemLog`].
//!
//! Every read and write goes through one loop, so a command or a tick is
//! always processed to completion before the next one starts and nobody
//! ever observes a half-updated ambulance/patient pair. The loop selects,
//! in priority order, over:
//!
//! 1. the stop signal from [`SimulatorControl`],
//! 2. the movement tick timer (skipped while paused),
//! 3. commands sent by [`ServiceHandle`]s, each answered on a oneshot.
//!
//! The task ends when a stop is requested or every handle is dropped and
//! returns a [`ServiceReport`].

use std::sync::Arc;
use std::time::Duration;

use ambulance_types::{
    AdminDashboard, Ambulance, AmbulanceId, EmergencyReceipt, EmergencyRequest, Hospital,
    HospitalId, LogPage, MapState, PatientId, PatientStatusView,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::admin;
use crate::config::{DispatchConfig, SimulationConfig};
use crate::control::{ServiceEndReason, SimulatorControl, SimulatorStatus};
use crate::dispatch::{self, Assignment};
use crate::error::DispatchError;
use crate::log::SystemLog;
use crate::movement;
use crate::store::Store;
use crate::views;

type Reply<T> = oneshot::Sender<Result<T, DispatchError>>;

/// A request for the service task, carrying the channel for its answer.
#[derive(Debug)]
enum Command {
    Submit {
        request: EmergencyRequest,
        reply: Reply<EmergencyReceipt>,
    },
    Dispatch {
        patient: PatientId,
        reply: Reply<Assignment>,
    },
    Release {
        ambulance: AmbulanceId,
        reply: Reply<()>,
    },
    ReleaseAll {
        reply: oneshot::Sender<usize>,
    },
    MarkCompleted {
        patient: PatientId,
        reply: Reply<()>,
    },
    Status {
        patient: PatientId,
        reply: Reply<PatientStatusView>,
    },
    MapState {
        reply: oneshot::Sender<MapState>,
    },
    Dashboard {
        reply: oneshot::Sender<AdminDashboard>,
    },
    Logs {
        limit: usize,
        reply: oneshot::Sender<LogPage>,
    },
    Ambulances {
        reply: oneshot::Sender<Vec<Ambulance>>,
    },
    Ambulance {
        ambulance: AmbulanceId,
        reply: Reply<Ambulance>,
    },
    Hospitals {
        reply: oneshot::Sender<Vec<Hospital>>,
    },
    Hospital {
        hospital: HospitalId,
        reply: Reply<Hospital>,
    },
}

/// Result of a service run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceReport {
    /// The reason the service ended.
    pub end_reason: ServiceEndReason,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Entry point for starting the dispatch service.
#[derive(Debug)]
pub struct DispatchService;

impl DispatchService {
    /// Spawn the service task on the current tokio runtime.
    ///
    /// The first movement tick runs one `tick_interval_ms` after spawning.
    pub fn spawn(
        store: Store,
        config: &DispatchConfig,
    ) -> (ServiceHandle, JoinHandle<ServiceReport>) {
        let (commands_tx, commands_rx) = mpsc::channel(config.service.command_buffer.max(1));
        let control = Arc::new(SimulatorControl::new());

        let state = ServiceState {
            store,
            log: SystemLog::new(config.logging.retention),
            simulation: config.simulation.clone(),
            speed_kmh: config.eta.speed_kmh,
            dashboard_limit: config.logging.dashboard_limit,
        };
        let task = tokio::spawn(run(state, commands_rx, Arc::clone(&control)));

        let handle = ServiceHandle {
            commands: commands_tx,
            control,
        };
        (handle, task)
    }
}

/// State owned exclusively by the service task.
struct ServiceState {
    store: Store,
    log: SystemLog,
    simulation: SimulationConfig,
    speed_kmh: f64,
    dashboard_limit: usize,
}

async fn run(
    mut state: ServiceState,
    mut commands: mpsc::Receiver<Command>,
    control: Arc<SimulatorControl>,
) -> ServiceReport {
    let period = Duration::from_millis(state.simulation.tick_interval_ms.max(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first interval tick completes immediately.
    ticker.tick().await;

    info!(
        tick_interval_ms = state.simulation.tick_interval_ms,
        ambulances = state.store.ambulances.len(),
        hospitals = state.store.hospitals.len(),
        "Dispatch service starting"
    );

    let end_reason = loop {
        tokio::select! {
            biased;
            () = control.stopped() => {
                info!("Operator stop requested");
                break ServiceEndReason::OperatorStop;
            }
            _ = ticker.tick() => {
                if control.is_paused() {
                    debug!("Simulator paused, tick skipped");
                    continue;
                }
                let tick = control.next_tick();
                movement::run_tick(&mut state.store, &mut state.log, &state.simulation, tick);
            }
            command = commands.recv() => {
                let Some(command) = command else {
                    info!("All service handles dropped");
                    break ServiceEndReason::HandlesClosed;
                };
                state.handle(command);
            }
        }
    };

    ServiceReport {
        end_reason,
        total_ticks: control.ticks(),
    }
}

impl ServiceState {
    fn handle(&mut self, command: Command) {
        // A dropped receiver means the caller gave up; nothing to undo.
        let delivered = match command {
            Command::Submit { request, reply } => reply
                .send(dispatch::submit_emergency(
                    &mut self.store,
                    &mut self.log,
                    &request,
                    self.speed_kmh,
                ))
                .is_ok(),
            Command::Dispatch { patient, reply } => reply
                .send(dispatch::dispatch(
                    &mut self.store,
                    &mut self.log,
                    patient,
                    self.speed_kmh,
                ))
                .is_ok(),
            Command::Release { ambulance, reply } => reply
                .send(admin::release(&mut self.store, &mut self.log, ambulance))
                .is_ok(),
            Command::ReleaseAll { reply } => reply
                .send(admin::release_all(&mut self.store, &mut self.log))
                .is_ok(),
            Command::MarkCompleted { patient, reply } => reply
                .send(admin::mark_completed(&mut self.store, &mut self.log, patient))
                .is_ok(),
            Command::Status { patient, reply } => reply
                .send(views::status_view(&self.store, patient, self.speed_kmh))
                .is_ok(),
            Command::MapState { reply } => reply
                .send(views::map_state(&self.store, self.speed_kmh))
                .is_ok(),
            Command::Dashboard { reply } => reply
                .send(views::dashboard(
                    &self.store,
                    &self.log,
                    self.speed_kmh,
                    self.dashboard_limit,
                ))
                .is_ok(),
            Command::Logs { limit, reply } => {
                reply.send(views::log_page(&self.log, limit)).is_ok()
            }
            Command::Ambulances { reply } => reply.send(self.store.ambulances.list()).is_ok(),
            Command::Ambulance { ambulance, reply } => reply
                .send(
                    self.store
                        .ambulances
                        .get(ambulance)
                        .cloned()
                        .ok_or(DispatchError::AmbulanceNotFound(ambulance)),
                )
                .is_ok(),
            Command::Hospitals { reply } => reply.send(self.store.hospitals.list()).is_ok(),
            Command::Hospital { hospital, reply } => reply
                .send(
                    self.store
                        .hospitals
                        .get(hospital)
                        .cloned()
                        .ok_or(DispatchError::HospitalNotFound(hospital)),
                )
                .is_ok(),
        };
        if !delivered {
            debug!("Reply dropped, caller went away");
        }
    }
}

/// Clonable handle for talking to a running [`DispatchService`].
///
/// Every method fails with [`DispatchError::ServiceUnavailable`] once the
/// service task has ended.
#[derive(Debug, Clone)]
pub struct ServiceHandle {
    commands: mpsc::Sender<Command>,
    control: Arc<SimulatorControl>,
}

impl ServiceHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, DispatchError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_closed| DispatchError::ServiceUnavailable)?;
        response
            .await
            .map_err(|_dropped| DispatchError::ServiceUnavailable)
    }

    /// Record a new emergency and dispatch it.
    pub async fn submit_emergency(
        &self,
        request: EmergencyRequest,
    ) -> Result<EmergencyReceipt, DispatchError> {
        self.request(|reply| Command::Submit { request, reply })
            .await?
    }

    /// Retry dispatch for a patient still `WAITING`.
    pub async fn dispatch_patient(&self, patient: PatientId) -> Result<Assignment, DispatchError> {
        self.request(|reply| Command::Dispatch { patient, reply })
            .await?
    }

    /// Return a `COMPLETED` ambulance to the pool.
    pub async fn release(&self, ambulance: AmbulanceId) -> Result<(), DispatchError> {
        self.request(|reply| Command::Release { ambulance, reply })
            .await?
    }

    /// Release every `COMPLETED` ambulance; returns how many were released.
    pub async fn release_all(&self) -> Result<usize, DispatchError> {
        self.request(|reply| Command::ReleaseAll { reply }).await
    }

    /// Close a patient by hand and free its ambulance.
    pub async fn mark_completed(&self, patient: PatientId) -> Result<(), DispatchError> {
        self.request(|reply| Command::MarkCompleted { patient, reply })
            .await?
    }

    /// Current status of one patient.
    pub async fn status(&self, patient: PatientId) -> Result<PatientStatusView, DispatchError> {
        self.request(|reply| Command::Status { patient, reply })
            .await?
    }

    /// Snapshot for the live map.
    pub async fn map_state(&self) -> Result<MapState, DispatchError> {
        self.request(|reply| Command::MapState { reply }).await
    }

    /// Map snapshot plus recent audit entries.
    pub async fn dashboard(&self) -> Result<AdminDashboard, DispatchError> {
        self.request(|reply| Command::Dashboard { reply }).await
    }

    /// The newest `limit` audit entries.
    pub async fn logs(&self, limit: usize) -> Result<LogPage, DispatchError> {
        self.request(|reply| Command::Logs { limit, reply }).await
    }

    /// All ambulances in fleet order.
    pub async fn ambulances(&self) -> Result<Vec<Ambulance>, DispatchError> {
        self.request(|reply| Command::Ambulances { reply }).await
    }

    /// One ambulance by id.
    pub async fn ambulance(&self, ambulance: AmbulanceId) -> Result<Ambulance, DispatchError> {
        self.request(|reply| Command::Ambulance { ambulance, reply })
            .await?
    }

    /// All hospitals in registration order.
    pub async fn hospitals(&self) -> Result<Vec<Hospital>, DispatchError> {
        self.request(|reply| Command::Hospitals { reply }).await
    }

    /// One hospital by id.
    pub async fn hospital(&self, hospital: HospitalId) -> Result<Hospital, DispatchError> {
        self.request(|reply| Command::Hospital { hospital, reply })
            .await?
    }

    /// Suspend movement ticks. Commands are still served.
    pub fn pause(&self) {
        self.control.pause();
        info!("Simulator paused");
    }

    /// Resume movement ticks.
    pub fn resume(&self) {
        self.control.resume();
        info!("Simulator resumed");
    }

    /// Ask the service to stop after the command or tick in progress.
    pub fn shutdown(&self) {
        self.control.request_stop();
    }

    /// Ticks executed so far.
    pub fn ticks(&self) -> u64 {
        self.control.ticks()
    }

    /// Simulator control snapshot.
    pub fn simulator_status(&self) -> SimulatorStatus {
        self.control.status()
    }

    /// The shared control state.
    pub const fn control(&self) -> &Arc<SimulatorControl> {
        &self.control
    }
}

/// Log the end of a service run.
pub fn log_service_end(report: &ServiceReport) {
    info!(
        reason = ?report.end_reason,
        total_ticks = report.total_ticks,
        "Dispatch service ended"
    );
    if report.total_ticks == 0 {
        warn!("Dispatch service ended with no ticks executed");
    }
}
