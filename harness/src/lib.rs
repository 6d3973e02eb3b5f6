//! Ledger Harness Core Library
//!
//! Test-support functionality for standing up a QLDB ledger, including:
//! - Ledger identity and state models
//! - Remote ledger client abstraction (and the QLDB adapter)
//! - Lifecycle controller that blocks until a ledger is active or gone
//! - Driver factory for building configured session-bound handles
//! - Logging, configuration and error types

pub mod client;
pub mod config;
pub mod driver;
pub mod errors;
pub mod lifecycle;
pub mod logger;
pub mod models;
pub mod wait;

pub use client::{LedgerClient, QldbClient};
pub use config::HarnessConfig;
pub use driver::{AwsSessionProvider, DriverFactory, DriverOptions, LedgerDriver, SessionProvider};
pub use errors::{Error, Result};
pub use lifecycle::LedgerLifecycle;
pub use logger::{LogLevel, LogRecord, Logger, RecordingLogger, TracingLogger, VerbosityLogger};
pub use models::*;
pub use wait::WaitPolicy;
