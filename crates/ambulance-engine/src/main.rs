//! Dispatch engine binary.
//!
//! Wires the configured fleet into the dispatch service and keeps it
//! running until Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `ambulance-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the initial store from the fleet roster
//! 4. Spawn the dispatch service
//! 5. Wait for Ctrl-C, then request a clean stop
//! 6. Log the result

mod error;
mod fleet;

use std::path::Path;

use ambulance_core::config::DispatchConfig;
use ambulance_core::service::{self, DispatchService};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

const CONFIG_PATH: &str = "ambulance-config.yaml";

/// Application entry point for the dispatch engine.
///
/// # Errors
///
/// Returns an error if configuration, the fleet roster, or the service
/// task fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // Logging is configured from the file, so load it first.
    let config = load_config()?;
    init_tracing(&config.logging.level)?;

    info!("ambulance-engine starting");
    if !Path::new(CONFIG_PATH).exists() {
        info!("Config file not found, using defaults");
    }
    info!(
        tick_interval_ms = config.simulation.tick_interval_ms,
        step_degrees = config.simulation.step_degrees,
        speed_kmh = config.eta.speed_kmh,
        log_retention = config.logging.retention,
        "Configuration loaded"
    );

    let store = fleet::build_store(&config.fleet)?;

    let (handle, task) = DispatchService::spawn(store, &config);
    info!("Dispatch service running, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    handle.shutdown();

    let report = task.await?;
    service::log_service_end(&report);

    info!(
        end_reason = ?report.end_reason,
        total_ticks = report.total_ticks,
        "ambulance-engine shutdown complete"
    );
    Ok(())
}

/// Load `ambulance-config.yaml` from the working directory, or defaults.
fn load_config() -> Result<DispatchConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok(DispatchConfig::from_file(config_path)?)
    } else {
        // Defaults still honour DISPATCH_LOG_LEVEL.
        Ok(DispatchConfig::parse("{}")?)
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) -> Result<(), EngineError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).map_err(|err| EngineError::LogFilter {
            level: level.to_owned(),
            message: err.to_string(),
        })?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
    Ok(())
}
