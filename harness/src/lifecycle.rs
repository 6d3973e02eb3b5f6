//! Ledger lifecycle controller
//!
//! Provisioning and teardown are asynchronous on the service side and there
//! is no completion notification, so both directions are driven by polling
//! `describe_ledger` at a fixed cadence:
//!
//! ```text
//!         create()                  delete()
//! NONE ----------> CREATING  --->  ACTIVE ----------> DELETING ---> ABSENT
//! ```
//!
//! `create` does not return until `ACTIVE` has been observed, and `delete`
//! does not return until the ledger is confirmed absent (or already was).
//! Both take `&mut self`: one controller drives one ledger identity at a time.

use std::sync::Arc;

use crate::client::LedgerClient;
use crate::errors::Result;
use crate::logger::{LogLevel, Logger};
use crate::models::{CreateLedgerRequest, DeleteOutcome, LedgerIdentity, LedgerState};
use crate::wait::{PollTracker, WaitPolicy};

/// Drives one ledger through creation and deletion
pub struct LedgerLifecycle<C> {
    client: C,
    identity: LedgerIdentity,
    logger: Arc<dyn Logger>,
    policy: WaitPolicy,
}

impl<C: LedgerClient> LedgerLifecycle<C> {
    /// Create a controller with the default (unbounded, 5 s) wait policy
    pub fn new(client: C, identity: LedgerIdentity, logger: Arc<dyn Logger>) -> Self {
        Self {
            client,
            identity,
            logger,
            policy: WaitPolicy::default(),
        }
    }

    /// Replace the wait policy used by both polling loops
    pub fn with_policy(mut self, policy: WaitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The ledger this controller drives
    pub fn identity(&self) -> &LedgerIdentity {
        &self.identity
    }

    /// Create the ledger and block until it is active.
    ///
    /// A failed create request is returned as-is; it is not retried.
    pub async fn create(&mut self) -> Result<()> {
        let name = self.identity.name().to_string();
        self.log(&format!("Creating ledger named {} ...", name), LogLevel::Info);

        let req = CreateLedgerRequest::new(&name);
        if let Err(e) = self.client.create_ledger(&req).await {
            self.log(&format!("Failed to create ledger {}: {}", name, e), LogLevel::Error);
            return Err(e);
        }

        self.wait_until_active().await
    }

    /// Delete the ledger and block until it is gone.
    ///
    /// Deleting a ledger that does not exist succeeds with
    /// [`DeleteOutcome::AlreadyAbsent`] and skips the wait entirely.
    pub async fn delete(&mut self) -> Result<DeleteOutcome> {
        let name = self.identity.name().to_string();
        self.log(&format!("Deleting ledger {}", name), LogLevel::Info);

        // Best effort: if protection stays on, the delete below reports it.
        if let Err(e) = self.client.update_ledger(&name, false).await {
            self.log(
                &format!("Ignoring failure to disable deletion protection: {}", e),
                LogLevel::Debug,
            );
        }

        match self.client.delete_ledger(&name).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                self.log("Encountered resource not found", LogLevel::Info);
                return Ok(DeleteOutcome::AlreadyAbsent);
            }
            Err(e) => {
                self.log("Encountered error during deletion", LogLevel::Error);
                self.log(&e.to_string(), LogLevel::Error);
                return Err(e);
            }
        }

        self.wait_until_absent().await?;
        Ok(DeleteOutcome::Deleted)
    }

    /// Poll until a describe call reports `ACTIVE`
    pub async fn wait_until_active(&mut self) -> Result<()> {
        self.log("Waiting for ledger to become active...", LogLevel::Info);
        let mut tracker = PollTracker::start(&self.policy, self.identity.name(), "ACTIVE");

        loop {
            let observed = match self.observe().await {
                Ok(LedgerState::Active) => {
                    self.log("Success. Ledger is active and ready to use.", LogLevel::Info);
                    return Ok(());
                }
                Ok(state) => {
                    tracker.observed();
                    state.to_string()
                }
                Err(e) => {
                    self.log(&format!("Describe failed while waiting: {}", e), LogLevel::Debug);
                    tracker.failed(&e)?;
                    "describe failed".to_string()
                }
            };

            self.log(
                &format!("The ledger is still creating ({}). Please wait...", observed),
                LogLevel::Info,
            );
            tracker.check_bounds()?;
            tracker.pause().await;
        }
    }

    /// Poll until a describe call reports the ledger as not found
    pub async fn wait_until_absent(&mut self) -> Result<()> {
        self.log("Waiting for ledger to be deleted...", LogLevel::Info);
        let mut tracker = PollTracker::start(&self.policy, self.identity.name(), "ABSENT");

        loop {
            let observed = match self.observe().await {
                Ok(LedgerState::Absent) => {
                    self.log("The ledger is deleted", LogLevel::Info);
                    return Ok(());
                }
                Ok(state) => {
                    tracker.observed();
                    state.to_string()
                }
                Err(e) => {
                    self.log(&format!("Describe failed while waiting: {}", e), LogLevel::Debug);
                    tracker.failed(&e)?;
                    "describe failed".to_string()
                }
            };

            self.log(
                &format!("The ledger is still deleting ({}). Please wait...", observed),
                LogLevel::Info,
            );
            tracker.check_bounds()?;
            tracker.pause().await;
        }
    }

    /// One describe call, with not-found folded into [`LedgerState::Absent`].
    ///
    /// `Err` therefore always means the state could not be observed.
    pub async fn observe(&self) -> Result<LedgerState> {
        match self.client.describe_ledger(self.identity.name()).await {
            Ok(description) => Ok(description.state),
            Err(e) if e.is_not_found() => Ok(LedgerState::Absent),
            Err(e) => Err(e),
        }
    }

    fn log(&self, message: &str, level: LogLevel) {
        self.logger.log(message, level);
    }
}
