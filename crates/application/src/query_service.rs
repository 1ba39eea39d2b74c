use std::sync::Arc;

use netscope_core::{AppResult, EventScope};
use netscope_domain::{EventFilter, PageCursor, ResourceEvent};

use crate::event_ports::{EventPage, EventRangeQuery, EventStore};


/// Default page size when the caller does not ask for one.
const DEFAULT_PAGE_SIZE: u32 = 25;

/// Hard per-page bound; larger requests are clamped, not rejected.
const MAX_PAGE_SIZE: u32 = 100;

/// One paginated list request as it arrives from the transport layer.
#[derive(Debug, Clone, Default)]
pub struct ListEventsRequest {
    /// Optional narrowing to one secondary ordering.
    pub filter: EventFilter,
    /// Opaque resume token from a previous page, still encoded.
    pub cursor: Option<String>,
    /// Requested page size; clamped to 1..=100, default 25.
    pub page_size: Option<u32>,
}

/// Application service for the read-only event query paths.
#[derive(Clone)]
pub struct EventQueryService {
    store: Arc<dyn EventStore>,
}

impl EventQueryService {
    /// Creates a service from a store implementation.
    #[must_use]
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Lists events in the scope, time-ordered within the selected ordering.
    ///
    /// An empty scope yields an empty page; a corrupt cursor fails with
    /// `InvalidCursor` and the caller restarts from the start of the range.
    pub async fn list_events(
        &self,
        scope: &EventScope,
        request: ListEventsRequest,
    ) -> AppResult<EventPage> {
        let ordering = request.filter.ordering()?;
        let after = request
            .cursor
            .as_deref()
            .map(PageCursor::decode)
            .transpose()?;
        let limit = request
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        self.store
            .list_events(scope, EventRangeQuery {
                ordering,
                after,
                limit,
            })
            .await
    }

    /// Looks up a single event by identity for drill-down views.
    ///
    /// Absence is a normal outcome and surfaces as `None`, never as an error.
    pub async fn get_event(
        &self,
        scope: &EventScope,
        event_id: &str,
    ) -> AppResult<Option<ResourceEvent>> {
        self.store.find_event(scope, event_id).await
    }
}
