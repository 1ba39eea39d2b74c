use netscope_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Server-side filter selecting one of the secondary event orderings.
///
/// Each ordering is a distinct time-ordered key, so a request may narrow by
/// resource or by service but not both at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    /// Restrict to events affecting this resource.
    pub resource_id: Option<String>,
    /// Restrict to events emitted by this provider service.
    pub service: Option<String>,
}

impl EventFilter {
    /// Resolves the filter into the ordering key that serves it.
    pub fn ordering(&self) -> AppResult<EventOrdering> {
        match (self.resource_id.as_deref(), self.service.as_deref()) {
            (Some(_), Some(_)) => Err(AppError::Validation(
                "resource_id and service filters cannot be combined".to_owned(),
            )),
            (Some(resource_id), None) => Ok(EventOrdering::ByResource(resource_id.to_owned())),
            (None, Some(service)) => Ok(EventOrdering::ByService(service.to_owned())),
            (None, None) => Ok(EventOrdering::ByScope),
        }
    }
}

/// Ordering key a list query ranges over, always time-ordered within its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOrdering {
    /// All events in the account+region scope.
    ByScope,
    /// Events for one resource within the scope.
    ByResource(String),
    /// Events from one provider service within the scope.
    ByService(String),
}
