//! The system log: an append-only, capped audit trail.
//!
//! Core operations report lifecycle events through the [`LogSink`] trait.
//! [`SystemLog`] keeps the newest entries in a ring buffer for the admin
//! dashboard and mirrors every append to `tracing`.

use std::collections::VecDeque;

use ambulance_types::{LogLevel, SystemLogEntry};
use chrono::Utc;
use tracing::{error, info, warn};

/// Entries retained when no retention is configured.
pub const DEFAULT_RETENTION: usize = 1000;

/// Destination for `(level, message)` audit events.
pub trait LogSink: Send {
    /// Append one entry.
    fn append(&mut self, level: LogLevel, message: String);

    /// Append an info-level entry.
    fn info(&mut self, message: String) {
        self.append(LogLevel::Info, message);
    }

    /// Append a warning-level entry.
    fn warning(&mut self, message: String) {
        self.append(LogLevel::Warning, message);
    }

    /// Append an error-level entry.
    fn error(&mut self, message: String) {
        self.append(LogLevel::Error, message);
    }
}

/// Ring buffer of the most recent [`SystemLogEntry`] values.
#[derive(Debug, Clone)]
pub struct SystemLog {
    entries: VecDeque<SystemLogEntry>,
    retention: usize,
}

impl SystemLog {
    /// Create a log keeping at most `retention` entries (minimum one).
    pub fn new(retention: usize) -> Self {
        let retention = retention.max(1);
        Self {
            entries: VecDeque::with_capacity(retention.min(DEFAULT_RETENTION)),
            retention,
        }
    }

    /// The newest `limit` entries, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<SystemLogEntry> {
        let skip = self.entries.len().saturating_sub(limit);
        self.entries.iter().skip(skip).cloned().collect()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained entries.
    pub const fn retention(&self) -> usize {
        self.retention
    }
}

impl Default for SystemLog {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION)
    }
}

impl LogSink for SystemLog {
    fn append(&mut self, level: LogLevel, message: String) {
        match level {
            LogLevel::Info => info!(target: "ambulance::system_log", "{message}"),
            LogLevel::Warning => warn!(target: "ambulance::system_log", "{message}"),
            LogLevel::Error => error!(target: "ambulance::system_log", "{message}"),
        }

        while self.entries.len() >= self.retention {
            self.entries.pop_front();
        }
        self.entries.push_back(SystemLogEntry {
            timestamp: Utc::now(),
            message,
            level,
        });
    }
}
