//! Setup/teardown flow tests against a simulated control plane
//!
//! These run offline: the ledger is simulated in memory and time is paused,
//! so the 5 second poll cadence costs nothing.

use async_trait::async_trait;
use ledger_harness::{
    CreateLedgerRequest, DeleteOutcome, Error, HarnessConfig, LedgerClient, LedgerDescription,
    LedgerState, LogLevel, RecordingLogger, Result, SessionProvider, WaitPolicy,
};
use ledger_harness_integration_tests::{unique_ledger_name, TestBase};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// In-memory ledger that takes a fixed number of polls to settle
struct SimulatedLedger {
    inner: Mutex<Simulation>,
    settle_after: u32,
}

#[derive(Default)]
struct Simulation {
    state: Option<LedgerState>,
    polls_left: u32,
    describes: u32,
}

impl SimulatedLedger {
    fn new(settle_after: u32) -> Self {
        Self {
            inner: Mutex::new(Simulation::default()),
            settle_after,
        }
    }

    fn describes(&self) -> u32 {
        self.inner.lock().unwrap().describes
    }
}

#[async_trait]
impl LedgerClient for SimulatedLedger {
    async fn create_ledger(&self, req: &CreateLedgerRequest) -> Result<()> {
        let mut sim = self.inner.lock().unwrap();
        if sim.state.is_some() {
            return Err(Error::remote("CreateLedger", "ResourceAlreadyExistsException"));
        }
        assert!(!req.deletion_protection);
        sim.state = Some(LedgerState::Creating);
        sim.polls_left = self.settle_after;
        Ok(())
    }

    async fn update_ledger(&self, name: &str, _deletion_protection: bool) -> Result<()> {
        match self.inner.lock().unwrap().state {
            Some(_) => Ok(()),
            None => Err(Error::LedgerNotFound(name.to_string())),
        }
    }

    async fn describe_ledger(&self, name: &str) -> Result<LedgerDescription> {
        let mut sim = self.inner.lock().unwrap();
        sim.describes += 1;

        let state = match sim.state.clone() {
            None => return Err(Error::LedgerNotFound(name.to_string())),
            Some(state) => state,
        };

        if sim.polls_left > 0 {
            sim.polls_left -= 1;
            return Ok(LedgerDescription::new(name, state));
        }

        match state {
            LedgerState::Creating | LedgerState::Active => {
                sim.state = Some(LedgerState::Active);
                Ok(LedgerDescription::new(name, LedgerState::Active))
            }
            _ => {
                sim.state = None;
                Err(Error::LedgerNotFound(name.to_string()))
            }
        }
    }

    async fn delete_ledger(&self, name: &str) -> Result<()> {
        let mut sim = self.inner.lock().unwrap();
        match sim.state {
            None => Err(Error::LedgerNotFound(name.to_string())),
            Some(_) => {
                sim.state = Some(LedgerState::Deleting);
                sim.polls_left = self.settle_after;
                Ok(())
            }
        }
    }
}

#[derive(Debug)]
struct StaticSession {
    region: String,
}

struct StaticSessionProvider {
    fail: bool,
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    type Session = StaticSession;

    async fn establish(&self, region: &str) -> Result<StaticSession> {
        if self.fail {
            return Err(Error::Session("no credentials".into()));
        }
        Ok(StaticSession {
            region: region.to_string(),
        })
    }
}

fn test_base(
    settle_after: u32,
    fail_sessions: bool,
) -> (
    TestBase<Arc<SimulatedLedger>, StaticSessionProvider>,
    Arc<SimulatedLedger>,
    Arc<RecordingLogger>,
) {
    let config = HarnessConfig::default()
        .with_ledger_name(unique_ledger_name())
        .unwrap();
    let ledger = Arc::new(SimulatedLedger::new(settle_after));
    let sink = Arc::new(RecordingLogger::new());
    let base = TestBase::with_parts(
        config,
        ledger.clone(),
        StaticSessionProvider { fail: fail_sessions },
        sink.clone(),
    );
    (base, ledger, sink)
}

#[tokio::test(start_paused = true)]
async fn test_full_setup_and_teardown() {
    let (mut base, ledger, sink) = test_base(2, false);
    let started = Instant::now();

    base.create_ledger().await.expect("ledger should become active");
    assert_eq!(ledger.describes(), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(10));
    assert_eq!(sink.count_containing("Success. Ledger is active"), 1);

    let driver = base.default_driver().await.expect("driver");
    assert_eq!(driver.ledger_name(), base.ledger_name());
    assert_eq!(driver.max_concurrent_transactions(), 10);
    assert_eq!(driver.retry_limit(), 4);
    assert_eq!(driver.session().region, "us-east-1");
    drop(driver);

    let outcome = base.delete_ledger().await.expect("ledger should be deleted");
    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert_eq!(ledger.describes(), 6);
    assert_eq!(sink.count_containing("The ledger is deleted"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_transcript_order() {
    let (mut base, _, sink) = test_base(1, false);
    let name = base.ledger_name().to_string();

    base.create_ledger().await.unwrap();
    base.delete_ledger().await.unwrap();

    assert_eq!(
        sink.messages(),
        vec![
            format!("Creating ledger named {} ...", name),
            "Waiting for ledger to become active...".to_string(),
            "The ledger is still creating (CREATING). Please wait...".to_string(),
            "Success. Ledger is active and ready to use.".to_string(),
            format!("Deleting ledger {}", name),
            "Waiting for ledger to be deleted...".to_string(),
            "The ledger is still deleting (DELETING). Please wait...".to_string(),
            "The ledger is deleted".to_string(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_teardown_without_setup_is_harmless() {
    let (mut base, ledger, sink) = test_base(0, false);

    let outcome = base.delete_ledger().await.unwrap();

    assert_eq!(outcome, DeleteOutcome::AlreadyAbsent);
    assert_eq!(ledger.describes(), 0);
    assert_eq!(sink.count_containing("Encountered resource not found"), 1);

    // The ignored protection update is only visible at debug verbosity.
    let debug_lines = sink
        .records()
        .iter()
        .filter(|r| r.level == LogLevel::Debug)
        .count();
    assert_eq!(debug_lines, 0);
}

#[tokio::test(start_paused = true)]
async fn test_second_create_fails_fast() {
    let (mut base, ledger, _) = test_base(0, false);
    base.create_ledger().await.unwrap();
    let describes = ledger.describes();

    let err = base.create_ledger().await.unwrap_err();

    assert_eq!(err.code(), "remote_error");
    assert_eq!(ledger.describes(), describes);
}

#[tokio::test(start_paused = true)]
async fn test_bounded_policy_from_config() {
    let config = HarnessConfig {
        wait: WaitPolicy::default().with_max_elapsed(Duration::from_secs(20)),
        ..HarnessConfig::default()
    };
    let ledger = Arc::new(SimulatedLedger::new(100));
    let mut base = TestBase::with_parts(
        config,
        ledger.clone(),
        StaticSessionProvider { fail: false },
        Arc::new(RecordingLogger::new()),
    );

    let err = base.create_ledger().await.unwrap_err();

    assert_eq!(err.code(), "wait_timeout");
    assert_eq!(ledger.describes(), 5);
}

#[tokio::test]
async fn test_driver_requires_session() {
    let (base, _, _) = test_base(0, true);

    let err = base.get_driver(base.ledger_name(), 5, 2).await.unwrap_err();

    assert_eq!(err, Error::Session("no credentials".into()));
}
