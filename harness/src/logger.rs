//! Logging capability shared by the lifecycle controller and driver handles
//!
//! The harness never writes to a global sink directly. Everything goes
//! through a [`Logger`], so tests can swap in a [`RecordingLogger`] and
//! assert on the lifecycle transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use crate::errors::{Error, Result};

/// Log severity, ordered from least to most verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Suppresses everything when used as a verbosity
    Off,
    Error,
    Info,
    Debug,
}

impl LogLevel {
    /// Whether a message at `self` passes a sink configured at `verbosity`
    pub fn enabled_at(self, verbosity: LogLevel) -> bool {
        self != LogLevel::Off && self <= verbosity
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(LogLevel::Off),
            "error" => Ok(LogLevel::Error),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(Error::Config(format!("unknown log level: {}", other))),
        }
    }
}

/// A synchronous log sink
pub trait Logger: Send + Sync {
    /// Deliver one message; must not return before the message is handed off
    fn log(&self, message: &str, level: LogLevel);
}

/// Default sink: forwards to `tracing`, tagging records with the ledger when known
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    ledger: Option<String>,
}

impl TracingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a `ledger` field to every record
    pub fn for_ledger(ledger: impl Into<String>) -> Self {
        Self {
            ledger: Some(ledger.into()),
        }
    }

    pub fn ledger(&self) -> Option<&str> {
        self.ledger.as_deref()
    }
}

impl Logger for TracingLogger {
    fn log(&self, message: &str, level: LogLevel) {
        match (level, self.ledger.as_deref()) {
            (LogLevel::Off, _) => {}
            (LogLevel::Error, Some(ledger)) => error!(ledger = %ledger, "{}", message),
            (LogLevel::Error, None) => error!("{}", message),
            (LogLevel::Info, Some(ledger)) => info!(ledger = %ledger, "{}", message),
            (LogLevel::Info, None) => info!("{}", message),
            (LogLevel::Debug, Some(ledger)) => debug!(ledger = %ledger, "{}", message),
            (LogLevel::Debug, None) => debug!("{}", message),
        }
    }
}

/// Wraps a sink and drops anything more verbose than `verbosity`
#[derive(Clone)]
pub struct VerbosityLogger {
    inner: Arc<dyn Logger>,
    verbosity: LogLevel,
}

impl VerbosityLogger {
    pub fn new(inner: Arc<dyn Logger>, verbosity: LogLevel) -> Self {
        Self { inner, verbosity }
    }

    pub fn verbosity(&self) -> LogLevel {
        self.verbosity
    }
}

impl Logger for VerbosityLogger {
    fn log(&self, message: &str, level: LogLevel) {
        if level.enabled_at(self.verbosity) {
            self.inner.log(message, level);
        }
    }
}

impl fmt::Debug for VerbosityLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerbosityLogger")
            .field("verbosity", &self.verbosity)
            .finish_non_exhaustive()
    }
}

/// One delivered log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub message: String,
    pub level: LogLevel,
    pub logged_at: DateTime<Utc>,
}

/// In-memory sink that keeps every record, in order
#[derive(Debug, Default)]
pub struct RecordingLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|r| r.message.clone()).collect()
    }

    /// Number of records whose message contains `needle`
    pub fn count_containing(&self, needle: &str) -> usize {
        self.lock().iter().filter(|r| r.message.contains(needle)).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogRecord>> {
        // A panic while holding the lock cannot leave the Vec half-written.
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Logger for RecordingLogger {
    fn log(&self, message: &str, level: LogLevel) {
        self.lock().push(LogRecord {
            message: message.to_string(),
            level,
            logged_at: Utc::now(),
        });
    }
}
