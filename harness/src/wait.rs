//! Polling policy for the lifecycle wait loops
//!
//! The default policy polls every five seconds forever, which is the
//! contract the integration suite has always relied on. Bounds are opt-in.

use std::time::Duration;
use tokio::time::Instant;

use crate::errors::{Error, Result};

/// Delay between describe calls when nothing else is configured
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// How long and how often the lifecycle controller polls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Fixed delay between consecutive describe calls
    pub poll_interval: Duration,
    /// Maximum describe calls per wait; `None` polls forever
    pub max_attempts: Option<u32>,
    /// Maximum wall time per wait; `None` polls forever
    pub max_elapsed: Option<Duration>,
    /// Maximum consecutive describe failures tolerated; `None` swallows them all
    pub max_poll_errors: Option<u32>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
            max_elapsed: None,
            max_poll_errors: None,
        }
    }
}

impl WaitPolicy {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn with_max_elapsed(mut self, elapsed: Duration) -> Self {
        self.max_elapsed = Some(elapsed);
        self
    }

    pub fn with_max_poll_errors(mut self, errors: u32) -> Self {
        self.max_poll_errors = Some(errors);
        self
    }

    /// True when no bound of any kind is configured
    pub fn is_unbounded(&self) -> bool {
        self.max_attempts.is_none() && self.max_elapsed.is_none() && self.max_poll_errors.is_none()
    }
}

/// Per-wait bookkeeping: counts polls and enforces the policy bounds
#[derive(Debug)]
pub(crate) struct PollTracker<'a> {
    policy: &'a WaitPolicy,
    ledger: &'a str,
    target: &'static str,
    started: Instant,
    attempts: u32,
    consecutive_errors: u32,
}

impl<'a> PollTracker<'a> {
    pub(crate) fn start(policy: &'a WaitPolicy, ledger: &'a str, target: &'static str) -> Self {
        Self {
            policy,
            ledger,
            target,
            started: Instant::now(),
            attempts: 0,
            consecutive_errors: 0,
        }
    }

    /// Record one describe call that produced a state
    pub(crate) fn observed(&mut self) {
        self.attempts += 1;
        self.consecutive_errors = 0;
    }

    /// Record one describe call that failed in transport
    pub(crate) fn failed(&mut self, err: &Error) -> Result<()> {
        self.attempts += 1;
        self.consecutive_errors += 1;

        match self.policy.max_poll_errors {
            Some(limit) if self.consecutive_errors > limit => Err(Error::PollErrorsExhausted {
                ledger: self.ledger.to_string(),
                errors: self.consecutive_errors,
                last: err.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Called after a non-terminal poll, before sleeping
    pub(crate) fn check_bounds(&self) -> Result<()> {
        let attempts_exhausted = self
            .policy
            .max_attempts
            .is_some_and(|max| self.attempts >= max);
        let time_exhausted = self
            .policy
            .max_elapsed
            .is_some_and(|max| self.started.elapsed() + self.policy.poll_interval > max);

        if attempts_exhausted || time_exhausted {
            return Err(Error::WaitTimeout {
                ledger: self.ledger.to_string(),
                target: self.target,
                attempts: self.attempts,
            });
        }
        Ok(())
    }

    pub(crate) async fn pause(&self) {
        tokio::time::sleep(self.policy.poll_interval).await;
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.attempts
    }
}
