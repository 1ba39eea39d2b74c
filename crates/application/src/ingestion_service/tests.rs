use std::sync::Arc;

use async_trait::async_trait;
use netscope_core::{AppError, AppResult, EventScope};
use netscope_domain::ResourceEvent;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::event_ports::{EventPage, EventRangeQuery, EventStore, IngestOutcome};

use super::EventIngestionService;

#[derive(Default)]
struct FakeEventStore {
    events: Mutex<Vec<ResourceEvent>>,
}

#[async_trait]
impl EventStore for FakeEventStore {
    async fn insert_if_absent(&self, event: ResourceEvent) -> AppResult<IngestOutcome> {
        let mut events = self.events.lock().await;
        let exists = events.iter().any(|stored| {
            stored.scope() == event.scope()
                && stored.occurred_at() == event.occurred_at()
                && stored.event_id() == event.event_id()
        });

        if exists {
            return Ok(IngestOutcome::Deduplicated);
        }

        events.push(event);
        Ok(IngestOutcome::Accepted)
    }

    async fn list_events(
        &self,
        scope: &EventScope,
        query: EventRangeQuery,
    ) -> AppResult<EventPage> {
        let events = self.events.lock().await;
        let mut matching: Vec<ResourceEvent> = events
            .iter()
            .filter(|stored| stored.scope() == scope)
            .cloned()
            .collect();
        matching.sort_by(|left, right| {
            (left.occurred_at(), left.event_id()).cmp(&(right.occurred_at(), right.event_id()))
        });
        matching.truncate(query.limit as usize);

        Ok(EventPage {
            events: matching,
            next_cursor: None,
        })
    }

    async fn find_event(
        &self,
        scope: &EventScope,
        event_id: &str,
    ) -> AppResult<Option<ResourceEvent>> {
        let events = self.events.lock().await;
        Ok(events
            .iter()
            .find(|stored| stored.scope() == scope && stored.event_id() == event_id)
            .cloned())
    }
}

fn state_change_notification() -> Value {
    json!({
        "version": "0",
        "id": "e1",
        "detail-type": "EC2 Instance State-change Notification",
        "source": "aws.ec2",
        "account": "111122223333",
        "time": "2026-01-22T15:55:00Z",
        "region": "us-east-1",
        "resources": ["arn:aws:ec2:us-east-1:111122223333:instance/i-0abc"],
        "detail": {"instance-id": "i-0abc", "state": "stopped"}
    })
}

fn service_with_store() -> (EventIngestionService, Arc<FakeEventStore>) {
    let store = Arc::new(FakeEventStore::default());
    (EventIngestionService::new(store.clone()), store)
}

#[tokio::test]
async fn normalizes_and_stores_a_state_change_notification() {
    let (service, store) = service_with_store();

    let outcome = service.ingest(state_change_notification()).await;
    assert!(matches!(outcome, Ok(IngestOutcome::Accepted)));

    let events = store.events.lock().await;
    assert_eq!(events.len(), 1);
    let stored = &events[0];
    assert_eq!(stored.scope().account_id(), "111122223333");
    assert_eq!(stored.scope().region(), "us-east-1");
    assert_eq!(stored.event_id(), "e1");
    assert_eq!(stored.service(), "ec2");
    assert_eq!(stored.resource_id(), "i-0abc");
    assert_eq!(stored.detail_type(), "EC2 Instance State-change Notification");
    assert_eq!(stored.payload()["state"], "stopped");
}

#[tokio::test]
async fn redelivered_notification_is_deduplicated() {
    let (service, store) = service_with_store();

    let first = service.ingest(state_change_notification()).await;
    assert!(matches!(first, Ok(IngestOutcome::Accepted)));

    let second = service.ingest(state_change_notification()).await;
    assert!(matches!(second, Ok(IngestOutcome::Deduplicated)));

    assert_eq!(store.events.lock().await.len(), 1);
}

#[tokio::test]
async fn missing_account_fails_fast_and_stores_nothing() {
    let (service, store) = service_with_store();

    let mut raw = state_change_notification();
    if let Some(object) = raw.as_object_mut() {
        object.remove("account");
    }

    let outcome = service.ingest(raw).await;
    assert!(matches!(outcome, Err(AppError::MalformedEvent(_))));
    assert!(store.events.lock().await.is_empty());
}

#[tokio::test]
async fn unparseable_event_time_is_malformed() {
    let (service, _store) = service_with_store();

    let mut raw = state_change_notification();
    raw["time"] = json!("yesterday-ish");

    let outcome = service.ingest(raw).await;
    assert!(matches!(outcome, Err(AppError::MalformedEvent(_))));
}

#[tokio::test]
async fn assigns_an_event_id_when_the_source_omits_one() {
    let (service, store) = service_with_store();

    let mut raw = state_change_notification();
    if let Some(object) = raw.as_object_mut() {
        object.remove("id");
    }

    let outcome = service.ingest(raw).await;
    assert!(matches!(outcome, Ok(IngestOutcome::Accepted)));

    let events = store.events.lock().await;
    assert_eq!(events.len(), 1);
    assert!(!events[0].event_id().is_empty());
}

#[tokio::test]
async fn falls_back_to_the_first_resource_arn() {
    let (service, store) = service_with_store();

    let mut raw = state_change_notification();
    raw["detail"] = json!({"state": "stopped"});

    let outcome = service.ingest(raw).await;
    assert!(matches!(outcome, Ok(IngestOutcome::Accepted)));

    let events = store.events.lock().await;
    assert_eq!(
        events[0].resource_id(),
        "arn:aws:ec2:us-east-1:111122223333:instance/i-0abc"
    );
}

#[tokio::test]
async fn notification_without_any_resource_is_malformed() {
    let (service, _store) = service_with_store();

    let mut raw = state_change_notification();
    raw["detail"] = json!({"state": "stopped"});
    raw["resources"] = json!([]);

    let outcome = service.ingest(raw).await;
    assert!(matches!(outcome, Err(AppError::MalformedEvent(_))));
}
