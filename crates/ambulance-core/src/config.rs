//! Configuration loading and typed config structures.
//!
//! The engine reads `ambulance-config.yaml` from the working directory. Every
//! field has a default, so an empty file (or no file) yields a working
//! configuration with an empty fleet.
//!
//! The tick interval and the per-tick step size are a coupled pair: the
//! defaults (1000 ms, 0.0005 degrees) approximate 50 km/h. Change them
//! together.

use std::path::Path;

use serde::Deserialize;
use uuid::Uuid;

use crate::eta::DEFAULT_SPEED_KMH;
use crate::geo::DEFAULT_ARRIVAL_EPSILON_KM;
use crate::log::DEFAULT_RETENTION;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration, mirroring `ambulance-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DispatchConfig {
    /// Movement simulator settings.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Travel-time estimation settings.
    #[serde(default)]
    pub eta: EtaConfig,

    /// Logging and audit-trail settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Dispatch service settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Initial ambulances and hospitals.
    #[serde(default)]
    pub fleet: FleetConfig,
}

impl DispatchConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `DISPATCH_LOG_LEVEL` overrides `logging.level` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.logging.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulator cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.tick_interval_ms == 0 {
            return Err(invalid("simulation.tick_interval_ms", "must be at least 1"));
        }
        require_positive("simulation.step_degrees", self.simulation.step_degrees)?;
        require_positive(
            "simulation.arrival_epsilon_km",
            self.simulation.arrival_epsilon_km,
        )?;
        require_positive("eta.speed_kmh", self.eta.speed_kmh)?;
        if self.logging.retention == 0 {
            return Err(invalid("logging.retention", "must be at least 1"));
        }
        if self.service.command_buffer == 0 {
            return Err(invalid("service.command_buffer", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_owned(),
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a positive finite number, got {value}"),
        })
    }
}

/// Movement simulator settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Real-time milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Distance moved per tick, in degrees.
    #[serde(default = "default_step_degrees")]
    pub step_degrees: f64,

    /// Distance under which an ambulance counts as arrived, in km.
    #[serde(default = "default_arrival_epsilon_km")]
    pub arrival_epsilon_km: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            step_degrees: default_step_degrees(),
            arrival_epsilon_km: default_arrival_epsilon_km(),
        }
    }
}

/// Travel-time estimation settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EtaConfig {
    /// Assumed ambulance speed in km/h.
    #[serde(default = "default_speed_kmh")]
    pub speed_kmh: f64,
}

impl Default for EtaConfig {
    fn default() -> Self {
        Self {
            speed_kmh: default_speed_kmh(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Number of system log entries kept in memory.
    #[serde(default = "default_retention")]
    pub retention: usize,

    /// Number of entries shown on the admin dashboard.
    #[serde(default = "default_dashboard_limit")]
    pub dashboard_limit: usize,
}

impl LoggingConfig {
    /// Override the log level with `DISPATCH_LOG_LEVEL` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DISPATCH_LOG_LEVEL") {
            self.level = val;
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            retention: default_retention(),
            dashboard_limit: default_dashboard_limit(),
        }
    }
}

/// Dispatch service settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// Capacity of the command channel.
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            command_buffer: default_command_buffer(),
        }
    }
}

/// Initial fleet and hospital roster.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FleetConfig {
    /// Ambulances, in dispatch preference order.
    #[serde(default)]
    pub ambulances: Vec<AmbulanceSpec>,

    /// Hospitals, in scoring tie-break order.
    #[serde(default)]
    pub hospitals: Vec<HospitalSpec>,
}

/// One ambulance entry in the fleet roster.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AmbulanceSpec {
    /// Pinned identifier; generated when absent.
    #[serde(default)]
    pub id: Option<Uuid>,
    /// Driver identifier.
    pub driver_id: String,
    /// Driver display name.
    pub driver_name: String,
    /// Starting latitude.
    pub lat: f64,
    /// Starting longitude.
    pub lng: f64,
}

/// One hospital entry in the roster.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HospitalSpec {
    /// Pinned identifier; generated when absent.
    #[serde(default)]
    pub id: Option<Uuid>,
    /// Display name.
    pub name: String,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Total general beds.
    #[serde(default)]
    pub general_beds: u32,
    /// Free general beds; defaults to `general_beds`.
    #[serde(default)]
    pub general_beds_available: Option<u32>,
    /// Total ICU beds.
    #[serde(default)]
    pub icu_beds: u32,
    /// Free ICU beds; defaults to `icu_beds`.
    #[serde(default)]
    pub icu_beds_available: Option<u32>,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_tick_interval_ms() -> u64 {
    1000
}

const fn default_step_degrees() -> f64 {
    0.0005
}

const fn default_arrival_epsilon_km() -> f64 {
    DEFAULT_ARRIVAL_EPSILON_KM
}

const fn default_speed_kmh() -> f64 {
    DEFAULT_SPEED_KMH
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_retention() -> usize {
    DEFAULT_RETENTION
}

const fn default_dashboard_limit() -> usize {
    50
}

const fn default_command_buffer() -> usize {
    64
}
