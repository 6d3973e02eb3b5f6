//! Ledger Harness Admin CLI
//!
//! Out-of-band control of the integration-test ledger:
//! - create   - Create the ledger and wait until it is active
//! - describe - Print the ledger's current state as JSON
//! - delete   - Delete the ledger and wait until it is gone
//!
//! Mostly useful for cleaning up after an interrupted test run.

use clap::{Parser, Subcommand};
use ledger_harness::{
    DeleteOutcome, HarnessConfig, LedgerClient, LedgerIdentity, LedgerLifecycle, LogLevel,
    QldbClient, TracingLogger,
};
use std::sync::Arc;
use tracing::{error, info};

type AdminError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Ledger name (overrides QLDB_HARNESS_LEDGER)
    #[arg(long, global = true)]
    ledger: Option<String>,

    /// AWS region (overrides QLDB_HARNESS_REGION)
    #[arg(long, global = true)]
    region: Option<String>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Create the ledger and block until it is active
    Create,
    /// Show the ledger's current state
    Describe,
    /// Delete the ledger and block until it is gone
    Delete,
}

fn load_config(args: &Args) -> Result<HarnessConfig, AdminError> {
    let config = HarnessConfig::from_env()?;
    let name = args
        .ledger
        .clone()
        .unwrap_or_else(|| config.identity.name().to_string());
    let region = args
        .region
        .clone()
        .unwrap_or_else(|| config.identity.region().to_string());

    Ok(HarnessConfig {
        identity: LedgerIdentity::new(name, region)?,
        ..config
    })
}

async fn run(command: Command, config: HarnessConfig) -> Result<(), AdminError> {
    let client = QldbClient::for_region(config.identity.region()).await;

    info!(
        ledger = %config.identity.name(),
        region = %config.identity.region(),
        command = ?command,
        "Running admin command"
    );

    match command {
        Command::Create => {
            let sink = Arc::new(TracingLogger::for_ledger(config.identity.name()));
            let mut lifecycle =
                LedgerLifecycle::new(client, config.identity, sink).with_policy(config.wait);
            lifecycle.create().await?;
            info!(ledger = %lifecycle.identity().name(), "Ledger ready");
        }
        Command::Describe => {
            let description = client.describe_ledger(config.identity.name()).await?;
            println!("{}", serde_json::to_string_pretty(&description)?);
        }
        Command::Delete => {
            let sink = Arc::new(TracingLogger::for_ledger(config.identity.name()));
            let mut lifecycle =
                LedgerLifecycle::new(client, config.identity, sink).with_policy(config.wait);
            if lifecycle.delete().await? == DeleteOutcome::AlreadyAbsent {
                info!("Nothing to delete");
            }
        }
    }

    Ok(())
}

fn max_level(verbosity: LogLevel) -> tracing::Level {
    match verbosity {
        LogLevel::Off | LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
    }
}

#[tokio::main]
async fn main() -> Result<(), AdminError> {
    let args = Args::parse();
    let config = load_config(&args)?;

    tracing_subscriber::fmt()
        .with_max_level(max_level(config.log_verbosity))
        .with_target(false)
        .without_time()
        .init();

    if let Err(e) = run(args.command, config).await {
        error!(error = %e, "Admin command failed");
        return Err(e);
    }
    Ok(())
}
