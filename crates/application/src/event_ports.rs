use async_trait::async_trait;
use netscope_core::{AppResult, EventScope};
use netscope_domain::{EventOrdering, PageCursor, ResourceEvent};
use serde_json::Value;

/// Outcome of one conditional event insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The record did not exist and was stored.
    Accepted,
    /// A record with the same identity already existed; nothing was written.
    Deduplicated,
}

/// One keyset range over an event ordering.
#[derive(Debug, Clone)]
pub struct EventRangeQuery {
    /// Ordering key the range scans over.
    pub ordering: EventOrdering,
    /// Resume strictly after this sort key, when present.
    pub after: Option<PageCursor>,
    /// Maximum number of records to return.
    pub limit: u32,
}

/// One page of time-ordered events plus the resume position, if any remain.
#[derive(Debug, Clone)]
pub struct EventPage {
    /// Records in non-decreasing `occurred_at` order.
    pub events: Vec<ResourceEvent>,
    /// Sort key of the last returned record when more records follow.
    pub next_cursor: Option<PageCursor>,
}

/// Append-only storage port for the event store.
///
/// The port deliberately exposes no update, delete, or overwrite operation:
/// a component constructed over this trait holds append-and-read capability
/// only, so violating the append-only invariant is structurally impossible
/// rather than merely checked. Retention purges are an out-of-band
/// administrative concern and have no code path here.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Inserts the event only if its identity is absent.
    ///
    /// Implementations must resolve same-identity races with the storage
    /// engine's per-key conditional-write primitive, never read-then-write.
    async fn insert_if_absent(&self, event: ResourceEvent) -> AppResult<IngestOutcome>;

    /// Range-scans one ordering within the scope.
    async fn list_events(&self, scope: &EventScope, query: EventRangeQuery)
    -> AppResult<EventPage>;

    /// Point lookup by event identifier within the scope.
    async fn find_event(
        &self,
        scope: &EventScope,
        event_id: &str,
    ) -> AppResult<Option<ResourceEvent>>;
}

/// Upstream bus the ingestion worker drains.
///
/// Delivery is at-least-once and notifications may arrive out of order
/// relative to their event time; idempotent ingestion absorbs both.
#[async_trait]
pub trait NotificationSource: Send + Sync {
    /// Pulls up to `max` raw notifications from the bus.
    async fn pull(&self, max: usize) -> AppResult<Vec<Value>>;

    /// Returns a notification to the bus for redelivery after a transient
    /// storage failure.
    async fn requeue(&self, raw: Value) -> AppResult<()>;
}
