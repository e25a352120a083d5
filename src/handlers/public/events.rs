// handlers/public/events.rs - Event discovery
//
// These run behind `optional_auth_middleware`; an `Actor` is present only when
// the caller sent a valid token.

use axum::extract::{Extension, Path, Query, State};
use uuid::Uuid;

use crate::database::{Page, PageParams};
use crate::middleware::{ApiResponse, ApiResult};
use crate::policy::Actor;
use crate::services::event_service::{
    EventDetail, EventListQuery, EventMatches, EventView, NearbyEvents, NearbyQuery,
};
use crate::services::{EventService, ServiceContext};
use crate::state::AppState;

/// GET /api/events - PRIVATE events are never listed
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<EventListQuery>,
) -> ApiResult<Page<EventView>> {
    let events = EventService::new(ServiceContext::new(&state)).list(query).await?;
    Ok(ApiResponse::success(events))
}

/// GET /api/events/nearby?city=&daysAhead=&limit=&openOnly=
pub async fn nearby(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> ApiResult<NearbyEvents> {
    let events = EventService::new(ServiceContext::new(&state)).nearby(query).await?;
    Ok(ApiResponse::success(events))
}

/// GET /api/events/:id
pub async fn show(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
    Path(id): Path<Uuid>,
) -> ApiResult<EventDetail> {
    let actor = actor.map(|Extension(actor)| actor);
    let event = EventService::new(ServiceContext::new(&state))
        .get(actor.as_ref(), id)
        .await?;
    Ok(ApiResponse::success(event))
}

/// GET /api/events/:id/matches
pub async fn matches(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
    Path(id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> ApiResult<EventMatches> {
    let actor = actor.map(|Extension(actor)| actor);
    let matches = EventService::new(ServiceContext::new(&state))
        .matches(actor.as_ref(), id, params)
        .await?;
    Ok(ApiResponse::success(matches))
}
