//! Shared primitives for all Rust crates in Netscope.

#![forbid(unsafe_code)]

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across Netscope crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Account and region pair used as the partition key for every persisted event.
///
/// Both components are opaque provider-assigned strings. Two scopes are the
/// same tenant only when both components match, so an `event_id` collision
/// across accounts never aliases records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventScope {
    account_id: NonEmptyString,
    region: NonEmptyString,
}

impl EventScope {
    /// Creates a scope from validated account and region components.
    pub fn new(account_id: impl Into<String>, region: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            account_id: NonEmptyString::new(account_id)
                .map_err(|_| AppError::Validation("account_id must not be empty".to_owned()))?,
            region: NonEmptyString::new(region)
                .map_err(|_| AppError::Validation("region must not be empty".to_owned()))?,
        })
    }

    /// Returns the account identifier.
    #[must_use]
    pub fn account_id(&self) -> &str {
        self.account_id.as_str()
    }

    /// Returns the region name.
    #[must_use]
    pub fn region(&self) -> &str {
        self.region.as_str()
    }
}

impl Display for EventScope {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}/{}",
            self.account_id.as_str(),
            self.region.as_str()
        )
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Raw notification missing a required field; not retried by this system.
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    /// Requested resource does not exist. Expected outcome, not a fault.
    #[error("not found: {0}")]
    NotFound(String),

    /// Pagination cursor could not be decoded; caller restarts the range.
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    /// Storage engine unreachable or overloaded; safe to retry.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
