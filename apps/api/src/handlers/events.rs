use axum::Json;
use axum::extract::{Path, Query, State};

use netscope_application::ListEventsRequest;
use netscope_core::{AppError, EventScope};
use netscope_domain::EventFilter;

use crate::dto::{EventListResponse, EventResponse};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct ListEventsParams {
    pub account_id: String,
    pub region: String,
    pub resource_id: Option<String>,
    pub service: Option<String>,
    pub cursor: Option<String>,
    pub page_size: Option<u32>,
}

pub async fn list_events_handler(
    State(state): State<AppState>,
    Query(params): Query<ListEventsParams>,
) -> ApiResult<Json<EventListResponse>> {
    let scope = EventScope::new(params.account_id, params.region)?;
    let page = state
        .event_query_service
        .list_events(&scope, ListEventsRequest {
            filter: EventFilter {
                resource_id: params.resource_id,
                service: params.service,
            },
            cursor: params.cursor,
            page_size: params.page_size,
        })
        .await?;

    Ok(Json(EventListResponse::from(page)))
}

#[derive(Debug, serde::Deserialize)]
pub struct GetEventParams {
    pub account_id: String,
    pub region: String,
}

pub async fn get_event_handler(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Query(params): Query<GetEventParams>,
) -> ApiResult<Json<EventResponse>> {
    let scope = EventScope::new(params.account_id, params.region)?;
    let event = state
        .event_query_service
        .get_event(&scope, event_id.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("event '{event_id}' in scope {scope}")))?;

    Ok(Json(EventResponse::from(event)))
}
