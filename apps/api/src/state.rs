use netscope_application::EventQueryService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub event_query_service: EventQueryService,
}
