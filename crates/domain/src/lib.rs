//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod cursor;
mod event;
mod query;

pub use cursor::PageCursor;
pub use event::{EVENT_SCHEMA_VERSION, ResourceEvent};
pub use query::{EventFilter, EventOrdering};
