//! Error types for the dispatch engine binary.
//!
//! [`EngineError`] wraps every failure mode during startup and shutdown so
//! `main` can propagate with `?`.

/// Top-level error for the dispatch engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ambulance_core::ConfigError,
    },

    /// A fleet roster entry could not be turned into a record.
    #[error("fleet error: {message}")]
    Fleet {
        /// Which entry was rejected and why.
        message: String,
    },

    /// The log filter could not be built from the configured level.
    #[error("invalid log filter {level:?}: {message}")]
    LogFilter {
        /// The configured level string.
        level: String,
        /// Parser message.
        message: String,
    },

    /// Waiting for the shutdown signal failed.
    #[error("signal error: {source}")]
    Signal {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The dispatch service task panicked or was cancelled.
    #[error("dispatch service task failed: {source}")]
    Service {
        /// The join failure.
        #[from]
        source: tokio::task::JoinError,
    },
}
