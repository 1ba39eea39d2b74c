//! Transport-layer response shapes.

mod common;
mod events;

pub use common::HealthResponse;
pub use events::{EventListResponse, EventResponse};
