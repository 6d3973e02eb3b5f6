//! Domain models for the ledger harness
//!
//! These types describe the remote resource the harness manages:
//! - Identity: the (name, region) pair naming one ledger
//! - State: what a describe call reports about that ledger
//! - Requests and outcomes exchanged with the ledger client

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{Error, Result};

const MAX_LEDGER_NAME_LEN: usize = 32;

/// Immutable identity of one ledger instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerIdentity {
    name: String,
    region: String,
}

impl LedgerIdentity {
    /// Validate and build an identity.
    ///
    /// Ledger names are 1-32 characters of ASCII letters, digits and
    /// hyphens, start with a letter or digit, never end with a hyphen,
    /// never contain `--`, and are not all digits.
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let region = region.into();
        validate_ledger_name(&name)?;
        if region.trim().is_empty() {
            return Err(Error::Config("region must not be empty".to_string()));
        }
        Ok(Self { name, region })
    }

    /// Skip validation for identities known at compile time
    pub(crate) fn trusted(name: &str, region: &str) -> Self {
        Self {
            name: name.to_string(),
            region: region.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

impl fmt::Display for LedgerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.region)
    }
}

/// Check a ledger name against the service naming rules
pub fn validate_ledger_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| Err(Error::InvalidLedgerName(format!("{:?}: {}", name, reason)));

    if name.is_empty() || name.len() > MAX_LEDGER_NAME_LEN {
        return invalid("must be 1-32 characters");
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return invalid("only letters, digits and hyphens are allowed");
    }
    if name.starts_with('-') || name.ends_with('-') {
        return invalid("must start and end with a letter or digit");
    }
    if name.contains("--") {
        return invalid("must not contain consecutive hyphens");
    }
    if name.chars().all(|c| c.is_ascii_digit()) {
        return invalid("must not be all digits");
    }
    Ok(())
}

/// Ledger state as observed by polling.
///
/// `Absent` is never reported by the service directly; it is inferred from
/// a not-found describe response. `Unknown` keeps the raw state string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LedgerState {
    Creating,
    Active,
    Deleting,
    Absent,
    Unknown(String),
}

impl LedgerState {
    /// Map the service's state string onto a harness state
    pub fn from_remote(raw: &str) -> Self {
        match raw {
            "CREATING" => LedgerState::Creating,
            "ACTIVE" => LedgerState::Active,
            "DELETING" => LedgerState::Deleting,
            other => LedgerState::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LedgerState::Creating => "CREATING",
            LedgerState::Active => "ACTIVE",
            LedgerState::Deleting => "DELETING",
            LedgerState::Absent => "ABSENT",
            LedgerState::Unknown(raw) => raw,
        }
    }
}

impl From<String> for LedgerState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "ABSENT" => LedgerState::Absent,
            other => LedgerState::from_remote(other),
        }
    }
}

impl From<LedgerState> for String {
    fn from(state: LedgerState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for LedgerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ledger permissions mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionsMode {
    /// Legacy mode: any principal with API access may run any statement
    #[default]
    AllowAll,
    /// Table-level IAM permissions
    Standard,
}

impl PermissionsMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionsMode::AllowAll => "ALLOW_ALL",
            PermissionsMode::Standard => "STANDARD",
        }
    }
}

/// Request to create a ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLedgerRequest {
    pub name: String,
    /// Disabled by default so teardown can delete the ledger
    #[serde(default)]
    pub deletion_protection: bool,
    #[serde(default)]
    pub permissions_mode: PermissionsMode,
}

impl CreateLedgerRequest {
    /// Test ledger policy: no deletion protection, `ALLOW_ALL` permissions
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deletion_protection: false,
            permissions_mode: PermissionsMode::AllowAll,
        }
    }
}

/// Result of a successful describe call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerDescription {
    pub name: String,
    pub state: LedgerState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_protection: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl LedgerDescription {
    pub fn new(name: impl Into<String>, state: LedgerState) -> Self {
        Self {
            name: name.into(),
            state,
            arn: None,
            deletion_protection: None,
            created_at: None,
        }
    }
}

/// How a delete call finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The ledger existed and is now confirmed absent
    Deleted,
    /// The ledger was already gone when the delete was issued
    AlreadyAbsent,
}
