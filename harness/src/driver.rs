//! Driver factory
//!
//! Builds session-bound driver handles for test code. The factory owns the
//! region and the shared logger; every handle it returns is independent of it.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_qldbsession::error::DisplayErrorContext;
use std::fmt;
use std::sync::Arc;

use crate::errors::{Error, Result};
use crate::logger::{LogLevel, Logger, TracingLogger, VerbosityLogger};
use crate::models::validate_ledger_name;

/// Default ceiling on in-flight transactions per driver
pub const DEFAULT_MAX_CONCURRENT_TRANSACTIONS: u16 = 50;
/// Default number of times a driver retries a failed transaction
pub const DEFAULT_RETRY_LIMIT: u8 = 4;

/// Establishes an authenticated session for a region
#[async_trait]
pub trait SessionProvider: Send + Sync {
    type Session: Send + Sync;

    /// Must fail rather than hand back a session that cannot authenticate
    async fn establish(&self, region: &str) -> Result<Self::Session>;
}

/// Session provider backed by the default AWS credential chain
#[derive(Debug, Clone, Default)]
pub struct AwsSessionProvider;

#[async_trait]
impl SessionProvider for AwsSessionProvider {
    type Session = aws_sdk_qldbsession::Client;

    async fn establish(&self, region: &str) -> Result<Self::Session> {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        // Resolve credentials now so a broken chain surfaces here, not mid-test.
        let credentials = config
            .credentials_provider()
            .ok_or_else(|| Error::Session(format!("no credentials provider for region {}", region)))?;
        credentials
            .provide_credentials()
            .await
            .map_err(|e| Error::Session(DisplayErrorContext(&e).to_string()))?;

        Ok(aws_sdk_qldbsession::Client::new(&config))
    }
}

/// Driver configuration, fixed at construction
#[derive(Clone)]
pub struct DriverOptions {
    pub logger: Arc<dyn Logger>,
    pub logger_verbosity: LogLevel,
    pub max_concurrent_transactions: u16,
    pub retry_limit: u8,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            logger: Arc::new(TracingLogger::new()),
            logger_verbosity: LogLevel::Info,
            max_concurrent_transactions: DEFAULT_MAX_CONCURRENT_TRANSACTIONS,
            retry_limit: DEFAULT_RETRY_LIMIT,
        }
    }
}

impl fmt::Debug for DriverOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverOptions")
            .field("logger_verbosity", &self.logger_verbosity)
            .field("max_concurrent_transactions", &self.max_concurrent_transactions)
            .field("retry_limit", &self.retry_limit)
            .finish_non_exhaustive()
    }
}

/// A configured, session-bound handle to one ledger
pub struct LedgerDriver<S> {
    ledger_name: String,
    session: S,
    options: DriverOptions,
    logger: VerbosityLogger,
}

impl<S> LedgerDriver<S> {
    /// Build a handle, letting the caller adjust the default options
    pub fn new(
        ledger_name: impl Into<String>,
        session: S,
        configure: impl FnOnce(&mut DriverOptions),
    ) -> Result<Self> {
        let ledger_name = ledger_name.into();
        validate_ledger_name(&ledger_name)?;

        let mut options = DriverOptions::default();
        configure(&mut options);

        if options.max_concurrent_transactions == 0 {
            return Err(Error::InvalidDriverOptions(
                "max_concurrent_transactions must be > 0".to_string(),
            ));
        }

        let logger = VerbosityLogger::new(Arc::clone(&options.logger), options.logger_verbosity);
        logger.log(
            &format!(
                "Driver for ledger {} configured with {} concurrent transactions and retry limit {}",
                ledger_name, options.max_concurrent_transactions, options.retry_limit
            ),
            LogLevel::Debug,
        );

        Ok(Self {
            ledger_name,
            session,
            options,
            logger,
        })
    }

    pub fn ledger_name(&self) -> &str {
        &self.ledger_name
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn options(&self) -> &DriverOptions {
        &self.options
    }

    pub fn max_concurrent_transactions(&self) -> u16 {
        self.options.max_concurrent_transactions
    }

    pub fn retry_limit(&self) -> u8 {
        self.options.retry_limit
    }

    pub fn logger_verbosity(&self) -> LogLevel {
        self.options.logger_verbosity
    }

    /// Log through the driver's sink at its configured verbosity
    pub fn log(&self, message: &str, level: LogLevel) {
        self.logger.log(message, level);
    }
}

impl<S> fmt::Debug for LedgerDriver<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerDriver")
            .field("ledger_name", &self.ledger_name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Produces driver handles bound to sessions in one region
pub struct DriverFactory<P> {
    provider: P,
    region: String,
    logger: Arc<dyn Logger>,
    verbosity: LogLevel,
}

impl<P: SessionProvider> DriverFactory<P> {
    /// Handles are created with Info verbosity unless overridden
    pub fn new(provider: P, region: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self {
            provider,
            region: region.into(),
            logger,
            verbosity: LogLevel::Info,
        }
    }

    pub fn with_verbosity(mut self, verbosity: LogLevel) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Establish a session and wrap it in a configured handle.
    ///
    /// A session failure aborts construction; no handle is returned.
    pub async fn get_driver(
        &self,
        ledger_name: &str,
        max_concurrent_transactions: u16,
        retry_limit: u8,
    ) -> Result<LedgerDriver<P::Session>> {
        let session = self.provider.establish(&self.region).await?;

        LedgerDriver::new(ledger_name, session, |options| {
            options.logger = Arc::clone(&self.logger);
            options.logger_verbosity = self.verbosity;
            options.max_concurrent_transactions = max_concurrent_transactions;
            options.retry_limit = retry_limit;
        })
    }
}
