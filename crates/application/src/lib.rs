//! Application services and ports.

#![forbid(unsafe_code)]

mod event_ports;
mod ingestion_service;
mod query_service;

pub use event_ports::{EventPage, EventRangeQuery, EventStore, IngestOutcome, NotificationSource};
pub use ingestion_service::EventIngestionService;
pub use query_service::{EventQueryService, ListEventsRequest};
