use chrono::{DateTime, Utc};
use netscope_core::{AppError, AppResult, EventScope, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current version tag stamped on every ingested payload.
pub const EVENT_SCHEMA_VERSION: u16 = 1;

/// Immutable record of a single resource lifecycle transition.
///
/// The identity `(account_id, region, occurred_at, event_id)` is unique in
/// storage; a second write carrying the same identity is an idempotent no-op.
/// Records are never mutated after creation, so this type offers no setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEvent {
    #[serde(flatten)]
    scope: EventScope,
    #[serde(rename = "event_time_utc")]
    occurred_at: DateTime<Utc>,
    event_id: NonEmptyString,
    resource_id: NonEmptyString,
    service: NonEmptyString,
    detail_type: NonEmptyString,
    payload: Value,
    schema_version: u16,
}

impl ResourceEvent {
    /// Creates an event record, rejecting any missing required field.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        scope: EventScope,
        occurred_at: DateTime<Utc>,
        event_id: impl Into<String>,
        resource_id: impl Into<String>,
        service: impl Into<String>,
        detail_type: impl Into<String>,
        payload: Value,
        schema_version: u16,
    ) -> AppResult<Self> {
        Ok(Self {
            scope,
            occurred_at,
            event_id: required_field(event_id, "event_id")?,
            resource_id: required_field(resource_id, "resource_id")?,
            service: required_field(service, "service")?,
            detail_type: required_field(detail_type, "detail_type")?,
            payload,
            schema_version,
        })
    }

    /// Returns the account and region scope.
    #[must_use]
    pub fn scope(&self) -> &EventScope {
        &self.scope
    }

    /// Returns the event timestamp (UTC).
    #[must_use]
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Returns the unique event identifier within the scope.
    #[must_use]
    pub fn event_id(&self) -> &str {
        self.event_id.as_str()
    }

    /// Returns the affected resource identifier.
    #[must_use]
    pub fn resource_id(&self) -> &str {
        self.resource_id.as_str()
    }

    /// Returns the originating provider service name (e.g. `ec2`).
    #[must_use]
    pub fn service(&self) -> &str {
        self.service.as_str()
    }

    /// Returns the categorical event kind.
    #[must_use]
    pub fn detail_type(&self) -> &str {
        self.detail_type.as_str()
    }

    /// Returns the opaque structured detail blob.
    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Returns the payload schema version tag.
    #[must_use]
    pub fn schema_version(&self) -> u16 {
        self.schema_version
    }
}

fn required_field(value: impl Into<String>, name: &str) -> AppResult<NonEmptyString> {
    NonEmptyString::new(value)
        .map_err(|_| AppError::MalformedEvent(format!("missing required field '{name}'")))
}
