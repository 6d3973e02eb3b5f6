//! Error types for the ledger harness

use thiserror::Error;

/// Result type alias using the harness Error
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger harness error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The remote service reported that the ledger does not exist
    #[error("Ledger not found: {0}")]
    LedgerNotFound(String),

    /// Ledger name rejected before any remote call
    #[error("Invalid ledger name: {0}")]
    InvalidLedgerName(String),

    /// Any other failure returned by the remote ledger service
    #[error("{operation} failed: {message}")]
    Remote {
        operation: &'static str,
        message: String,
    },

    /// AWS session or credential establishment failed
    #[error("Session error: {0}")]
    Session(String),

    /// Malformed harness configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Driver options rejected at construction time
    #[error("Invalid driver options: {0}")]
    InvalidDriverOptions(String),

    /// A wait loop hit its attempt or elapsed-time bound
    #[error("Timed out waiting for ledger {ledger} to become {target} after {attempts} polls")]
    WaitTimeout {
        ledger: String,
        target: &'static str,
        attempts: u32,
    },

    /// Too many consecutive describe failures while polling
    #[error("Gave up polling ledger {ledger} after {errors} consecutive describe failures: {last}")]
    PollErrorsExhausted {
        ledger: String,
        errors: u32,
        last: String,
    },
}

impl Error {
    /// Build a remote error from any displayable SDK failure
    pub fn remote(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Error::Remote {
            operation,
            message: err.to_string(),
        }
    }

    /// Whether this error means the ledger is already gone
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::LedgerNotFound(_))
    }

    /// Returns a stable error code for logs and assertions
    pub fn code(&self) -> &'static str {
        match self {
            Error::LedgerNotFound(_) => "ledger_not_found",
            Error::InvalidLedgerName(_) => "invalid_ledger_name",
            Error::Remote { .. } => "remote_error",
            Error::Session(_) => "session_error",
            Error::Config(_) => "config_error",
            Error::InvalidDriverOptions(_) => "invalid_driver_options",
            Error::WaitTimeout { .. } => "wait_timeout",
            Error::PollErrorsExhausted { .. } => "poll_errors_exhausted",
        }
    }
}
