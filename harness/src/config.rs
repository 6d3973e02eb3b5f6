//! Harness configuration (from environment)

use std::str::FromStr;
use std::time::Duration;

use crate::driver::DEFAULT_RETRY_LIMIT;
use crate::errors::{Error, Result};
use crate::logger::LogLevel;
use crate::models::LedgerIdentity;
use crate::wait::WaitPolicy;

const LEDGER_ENV: &str = "QLDB_HARNESS_LEDGER";
const REGION_ENV: &str = "QLDB_HARNESS_REGION";
const POLL_INTERVAL_ENV: &str = "QLDB_HARNESS_POLL_INTERVAL_SECS";
const MAX_POLL_ATTEMPTS_ENV: &str = "QLDB_HARNESS_MAX_POLL_ATTEMPTS";
const MAX_WAIT_ENV: &str = "QLDB_HARNESS_MAX_WAIT_SECS";
const MAX_POLL_ERRORS_ENV: &str = "QLDB_HARNESS_MAX_POLL_ERRORS";
const LOG_LEVEL_ENV: &str = "QLDB_HARNESS_LOG_LEVEL";
const MAX_CONCURRENT_ENV: &str = "QLDB_HARNESS_MAX_CONCURRENT_TRANSACTIONS";
const RETRY_LIMIT_ENV: &str = "QLDB_HARNESS_RETRY_LIMIT";

pub const DEFAULT_LEDGER_NAME: &str = "Rusttest";
pub const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_TEST_CONCURRENCY: u16 = 10;

/// Everything a test suite needs to stand up its ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub identity: LedgerIdentity,
    pub wait: WaitPolicy,
    pub log_verbosity: LogLevel,
    pub max_concurrent_transactions: u16,
    pub retry_limit: u8,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            identity: LedgerIdentity::trusted(DEFAULT_LEDGER_NAME, DEFAULT_REGION),
            wait: WaitPolicy::default(),
            log_verbosity: LogLevel::Info,
            max_concurrent_transactions: DEFAULT_TEST_CONCURRENCY,
            retry_limit: DEFAULT_RETRY_LIMIT,
        }
    }
}

impl HarnessConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup (for testing)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ledger = lookup(LEDGER_ENV).unwrap_or_else(|| DEFAULT_LEDGER_NAME.to_string());
        let region = lookup(REGION_ENV).unwrap_or_else(|| DEFAULT_REGION.to_string());
        let identity = LedgerIdentity::new(ledger, region)?;

        let poll_interval_secs =
            parse_var(&lookup, POLL_INTERVAL_ENV)?.unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
        if poll_interval_secs == 0 {
            return Err(Error::Config(format!("{} must be > 0", POLL_INTERVAL_ENV)));
        }
        let mut wait =
            WaitPolicy::default().with_poll_interval(Duration::from_secs(poll_interval_secs));
        wait.max_attempts = parse_var(&lookup, MAX_POLL_ATTEMPTS_ENV)?;
        wait.max_elapsed = parse_var::<u64, _>(&lookup, MAX_WAIT_ENV)?.map(Duration::from_secs);
        wait.max_poll_errors = parse_var(&lookup, MAX_POLL_ERRORS_ENV)?;

        let log_verbosity = parse_var(&lookup, LOG_LEVEL_ENV)?.unwrap_or(LogLevel::Info);
        let max_concurrent_transactions =
            parse_var(&lookup, MAX_CONCURRENT_ENV)?.unwrap_or(DEFAULT_TEST_CONCURRENCY);
        let retry_limit = parse_var(&lookup, RETRY_LIMIT_ENV)?.unwrap_or(DEFAULT_RETRY_LIMIT);

        Ok(Self {
            identity,
            wait,
            log_verbosity,
            max_concurrent_transactions,
            retry_limit,
        })
    }

    /// Same settings, different ledger
    pub fn with_ledger_name(mut self, name: impl Into<String>) -> Result<Self> {
        self.identity = LedgerIdentity::new(name, self.identity.region())?;
        Ok(self)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("{}={:?}: {}", key, raw, e))),
    }
}
