use chrono::SecondsFormat;
use netscope_application::EventPage;
use netscope_domain::{PageCursor, ResourceEvent};
use serde::Serialize;
use ts_rs::TS;

/// API representation of one stored lifecycle event.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/event-response.ts"
)]
pub struct EventResponse {
    pub account_id: String,
    pub region: String,
    /// RFC 3339 UTC timestamp of the lifecycle transition.
    pub event_time_utc: String,
    pub event_id: String,
    pub resource_id: String,
    pub service: String,
    pub detail_type: String,
    #[ts(type = "unknown")]
    pub payload: serde_json::Value,
    pub schema_version: u16,
}

impl From<ResourceEvent> for EventResponse {
    fn from(event: ResourceEvent) -> Self {
        Self {
            account_id: event.scope().account_id().to_owned(),
            region: event.scope().region().to_owned(),
            // AutoSi keeps stored sub-second precision on the wire instead
            // of truncating to whole seconds.
            event_time_utc: event
                .occurred_at()
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            event_id: event.event_id().to_owned(),
            resource_id: event.resource_id().to_owned(),
            service: event.service().to_owned(),
            detail_type: event.detail_type().to_owned(),
            payload: event.payload().clone(),
            schema_version: event.schema_version(),
        }
    }
}

/// One page of events plus the opaque resume token, when more remain.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/event-list-response.ts"
)]
pub struct EventListResponse {
    pub events: Vec<EventResponse>,
    pub next_cursor: Option<String>,
}

impl From<EventPage> for EventListResponse {
    fn from(page: EventPage) -> Self {
        Self {
            events: page.events.into_iter().map(EventResponse::from).collect(),
            next_cursor: page.next_cursor.as_ref().map(PageCursor::encode),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use netscope_core::EventScope;
    use netscope_domain::{EVENT_SCHEMA_VERSION, ResourceEvent};
    use serde_json::json;

    use super::EventResponse;

    fn event_at(timestamp: &str) -> ResourceEvent {
        let occurred_at: DateTime<Utc> = timestamp.parse().unwrap_or_else(|_| unreachable!());
        let scope = EventScope::new("111122223333", "us-east-1").unwrap_or_else(|_| unreachable!());
        ResourceEvent::new(
            scope,
            occurred_at,
            "e1",
            "i-0abc",
            "ec2",
            "state-change",
            json!({}),
            EVENT_SCHEMA_VERSION,
        )
        .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn wire_timestamp_keeps_sub_second_precision() {
        let response = EventResponse::from(event_at("2026-01-22T15:55:00.123Z"));
        assert_eq!(response.event_time_utc, "2026-01-22T15:55:00.123Z");
    }

    #[test]
    fn wire_timestamp_stays_compact_for_whole_seconds() {
        let response = EventResponse::from(event_at("2026-01-22T15:55:00Z"));
        assert_eq!(response.event_time_utc, "2026-01-22T15:55:00Z");
    }
}
