//! Live tests against QLDB
//!
//! Run with: QLDB_HARNESS_LIVE=1 cargo test --package ledger-harness-integration-tests
//!
//! These create and delete real ledgers (a few minutes each) and need AWS
//! credentials with QLDB permissions.

use ledger_harness::{DeleteOutcome, HarnessConfig};
use ledger_harness_integration_tests::{
    fixtures::{init_tracing, unique_ledger_name},
    skip_unless_live, TestBase,
};
use pretty_assertions::assert_eq;

async fn live_base() -> TestBase {
    init_tracing();
    dotenvy::dotenv().ok();
    let config = HarnessConfig::from_env()
        .and_then(|c| c.with_ledger_name(unique_ledger_name()))
        .expect("Invalid harness configuration");
    TestBase::connect(config)
        .await
        .expect("Failed to establish AWS session")
}

#[tokio::test]
async fn test_ledger_round_trip() {
    skip_unless_live!();
    let mut base = live_base().await;

    base.create_ledger().await.expect("Failed to create ledger");

    let driver = base.default_driver().await.expect("Failed to build driver");
    assert_eq!(driver.ledger_name(), base.ledger_name());
    assert_eq!(
        driver.max_concurrent_transactions(),
        base.config().max_concurrent_transactions
    );
    drop(driver);

    let outcome = base.delete_ledger().await.expect("Failed to delete ledger");
    assert_eq!(outcome, DeleteOutcome::Deleted);

    let outcome = base.delete_ledger().await.expect("Second delete should succeed");
    assert_eq!(outcome, DeleteOutcome::AlreadyAbsent);
}

#[tokio::test]
async fn test_delete_missing_ledger() {
    skip_unless_live!();
    let mut base = live_base().await;

    let outcome = base.delete_ledger().await.expect("Delete of missing ledger should succeed");
    assert_eq!(outcome, DeleteOutcome::AlreadyAbsent);
}
