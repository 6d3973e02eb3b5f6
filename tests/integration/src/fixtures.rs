//! Test fixtures and utilities

use uuid::Uuid;

const LIVE_ENV: &str = "QLDB_HARNESS_LIVE";

/// Generate a unique ledger name so suites can run in parallel
pub fn unique_ledger_name() -> String {
    format!("rusttest-{}", &Uuid::new_v4().simple().to_string()[..12])
}

/// Check if live AWS tests were requested
pub fn live_tests_enabled() -> bool {
    dotenvy::dotenv().ok();
    std::env::var(LIVE_ENV).map(|v| v == "1").unwrap_or(false)
}

/// Install a tracing subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time()
        .with_test_writer()
        .try_init();
}

/// Skip test if live runs are not enabled
#[macro_export]
macro_rules! skip_unless_live {
    () => {
        if !$crate::fixtures::live_tests_enabled() {
            eprintln!("Skipping test: QLDB_HARNESS_LIVE not set to 1");
            return;
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_harness::models::validate_ledger_name;

    #[test]
    fn test_unique_ledger_names_are_valid_and_distinct() {
        let a = unique_ledger_name();
        let b = unique_ledger_name();

        assert_ne!(a, b);
        assert!(validate_ledger_name(&a).is_ok(), "{a} should be a valid ledger name");
        assert!(a.len() <= 32);
    }
}
