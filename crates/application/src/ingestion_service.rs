use std::sync::Arc;

use chrono::{DateTime, Utc};
use netscope_core::{AppError, AppResult, EventScope};
use netscope_domain::{EVENT_SCHEMA_VERSION, ResourceEvent};
use serde_json::Value;
use uuid::Uuid;

use crate::event_ports::{EventStore, IngestOutcome};

#[cfg(test)]
mod tests;

/// Detail keys checked, in order, when extracting the affected resource.
const RESOURCE_DETAIL_KEYS: &[&str] = &[
    "instance-id",
    "InstanceId",
    "instanceId",
    "EC2InstanceId",
    "EC2InstanceID",
    "AutoScalingGroupName",
    "autoScalingGroupName",
];

/// Application service for idempotent event ingestion.
///
/// Normalizes raw provider notifications into canonical event records and
/// performs exactly one conditional storage write per call. At-least-once
/// redelivery upstream therefore yields at most one stored record per
/// identity.
#[derive(Clone)]
pub struct EventIngestionService {
    store: Arc<dyn EventStore>,
}

impl EventIngestionService {
    /// Creates a service from an append-only store implementation.
    #[must_use]
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Normalizes and stores one raw notification.
    ///
    /// Malformed input fails fast with [`AppError::MalformedEvent`] and must
    /// not be retried; transient storage failures surface as
    /// [`AppError::StorageUnavailable`] and are safe to retry.
    pub async fn ingest(&self, raw: Value) -> AppResult<IngestOutcome> {
        let event = normalize_notification(&raw)?;
        self.store.insert_if_absent(event).await
    }
}

/// Normalizes an EventBridge-shaped notification into the canonical record.
///
/// Expected raw shape:
/// `{"source": "aws.ec2", "detail-type": "...", "time": "...", "account":
/// "...", "region": "...", "id": "...", "resources": [...], "detail": {...}}`.
fn normalize_notification(raw: &Value) -> AppResult<ResourceEvent> {
    let account_id = required_string(raw, "account")?;
    let region = required_string(raw, "region")?;
    let scope = EventScope::new(account_id, region)
        .map_err(|error| AppError::MalformedEvent(error.to_string()))?;

    let occurred_at = parse_event_time(raw)?;
    let source = required_string(raw, "source")?;
    let service = source.strip_prefix("aws.").unwrap_or(source.as_str()).to_owned();
    let detail_type = required_string(raw, "detail-type")?;

    let event_id = raw
        .get("id")
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let payload = raw.get("detail").cloned().unwrap_or(Value::Null);
    let resource_id = extract_resource_id(raw, &payload).ok_or_else(|| {
        AppError::MalformedEvent("notification carries no resource identifier".to_owned())
    })?;

    ResourceEvent::new(
        scope,
        occurred_at,
        event_id,
        resource_id,
        service,
        detail_type,
        payload,
        EVENT_SCHEMA_VERSION,
    )
}

fn required_string(raw: &Value, field: &str) -> AppResult<String> {
    raw.get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .map(str::to_owned)
        .ok_or_else(|| AppError::MalformedEvent(format!("missing required field '{field}'")))
}

fn parse_event_time(raw: &Value) -> AppResult<DateTime<Utc>> {
    let text = required_string(raw, "time")?;
    DateTime::parse_from_rfc3339(text.as_str())
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|error| AppError::MalformedEvent(format!("unparseable event time: {error}")))
}

fn extract_resource_id(raw: &Value, detail: &Value) -> Option<String> {
    for key in RESOURCE_DETAIL_KEYS {
        if let Some(value) = detail.get(key).and_then(Value::as_str)
            && !value.trim().is_empty()
        {
            return Some(value.to_owned());
        }
    }

    raw.get("resources")
        .and_then(Value::as_array)
        .and_then(|resources| resources.first())
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .map(str::to_owned)
}
