//! Remote ledger client abstraction
//!
//! The lifecycle controller only needs four control-plane calls. They sit
//! behind [`LedgerClient`] so the controller can be driven by the real QLDB
//! API or by a scripted fake in tests.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_qldb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_qldb::types::PermissionsMode as SdkPermissionsMode;
use aws_sdk_qldb::Client;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::errors::{Error, Result};
use crate::models::{CreateLedgerRequest, LedgerDescription, LedgerState, PermissionsMode};

const RESOURCE_NOT_FOUND: &str = "ResourceNotFoundException";

/// Control-plane operations against a named ledger.
///
/// Implementations must report a missing ledger as
/// [`Error::LedgerNotFound`] from `describe_ledger` and `delete_ledger`.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn create_ledger(&self, req: &CreateLedgerRequest) -> Result<()>;

    async fn update_ledger(&self, name: &str, deletion_protection: bool) -> Result<()>;

    async fn describe_ledger(&self, name: &str) -> Result<LedgerDescription>;

    async fn delete_ledger(&self, name: &str) -> Result<()>;
}

#[async_trait]
impl<T: LedgerClient + ?Sized> LedgerClient for Arc<T> {
    async fn create_ledger(&self, req: &CreateLedgerRequest) -> Result<()> {
        (**self).create_ledger(req).await
    }

    async fn update_ledger(&self, name: &str, deletion_protection: bool) -> Result<()> {
        (**self).update_ledger(name, deletion_protection).await
    }

    async fn describe_ledger(&self, name: &str) -> Result<LedgerDescription> {
        (**self).describe_ledger(name).await
    }

    async fn delete_ledger(&self, name: &str) -> Result<()> {
        (**self).delete_ledger(name).await
    }
}

/// QLDB control-plane client
#[derive(Debug, Clone)]
pub struct QldbClient {
    client: Client,
}

impl QldbClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Load the default AWS configuration chain pinned to `region`
    pub async fn for_region(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl LedgerClient for QldbClient {
    async fn create_ledger(&self, req: &CreateLedgerRequest) -> Result<()> {
        let permissions = match req.permissions_mode {
            PermissionsMode::AllowAll => SdkPermissionsMode::AllowAll,
            PermissionsMode::Standard => SdkPermissionsMode::Standard,
        };

        let output = self
            .client
            .create_ledger()
            .name(&req.name)
            .deletion_protection(req.deletion_protection)
            .permissions_mode(permissions)
            .send()
            .await
            .map_err(|e| map_sdk_error("CreateLedger", &req.name, e))?;

        debug!(
            ledger = %req.name,
            state = ?output.state().map(|s| s.as_str()),
            "CreateLedger accepted"
        );
        Ok(())
    }

    async fn update_ledger(&self, name: &str, deletion_protection: bool) -> Result<()> {
        self.client
            .update_ledger()
            .name(name)
            .deletion_protection(deletion_protection)
            .send()
            .await
            .map_err(|e| map_sdk_error("UpdateLedger", name, e))?;

        Ok(())
    }

    async fn describe_ledger(&self, name: &str) -> Result<LedgerDescription> {
        let output = self
            .client
            .describe_ledger()
            .name(name)
            .send()
            .await
            .map_err(|e| map_sdk_error("DescribeLedger", name, e))?;

        let state = output
            .state()
            .map(|s| LedgerState::from_remote(s.as_str()))
            .unwrap_or_else(|| LedgerState::Unknown("UNKNOWN".to_string()));

        Ok(LedgerDescription {
            name: output.name().unwrap_or(name).to_string(),
            state,
            arn: output.arn().map(str::to_string),
            deletion_protection: output.deletion_protection(),
            created_at: output
                .creation_date_time()
                .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos())),
        })
    }

    async fn delete_ledger(&self, name: &str) -> Result<()> {
        self.client
            .delete_ledger()
            .name(name)
            .send()
            .await
            .map_err(|e| map_sdk_error("DeleteLedger", name, e))?;

        Ok(())
    }
}

/// Collapse an SDK failure into the harness taxonomy, keeping not-found distinguishable
fn map_sdk_error<E, R>(operation: &'static str, name: &str, err: SdkError<E, R>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    if err.code() == Some(RESOURCE_NOT_FOUND) {
        Error::LedgerNotFound(name.to_string())
    } else {
        Error::remote(operation, DisplayErrorContext(&err))
    }
}
