// handlers/protected/events.rs - Event management, registration and check-in

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::{CheckInOutcome, Event, EventParticipant};
use crate::middleware::{ApiResponse, ApiResult};
use crate::policy::Actor;
use crate::services::event_service::{
    CheckInRequest, CreateEventRequest, EventParticipants, ParticipantsQuery, UpdateEventRequest,
};
use crate::services::{EventService, ServiceContext};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoCheckInQuery {
    pub user_id: Option<Uuid>,
}

pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreateEventRequest>,
) -> ApiResult<Event> {
    let event = EventService::new(ServiceContext::new(&state))
        .create(&actor, payload)
        .await?;
    Ok(ApiResponse::created(event))
}

/// PUT /api/events/:id - Status changes go through the event state machine
pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEventRequest>,
) -> ApiResult<Event> {
    let event = EventService::new(ServiceContext::new(&state))
        .update(&actor, id, payload)
        .await?;
    Ok(ApiResponse::success(event))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    EventService::new(ServiceContext::new(&state))
        .delete(&actor, id)
        .await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}

/// POST /api/events/:id/join
pub async fn join(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> ApiResult<EventParticipant> {
    let participant = EventService::new(ServiceContext::new(&state))
        .join(&actor, id)
        .await?;
    Ok(ApiResponse::created(participant))
}

/// DELETE /api/events/:id/join
pub async fn leave(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    EventService::new(ServiceContext::new(&state))
        .leave(&actor, id)
        .await?;
    Ok(ApiResponse::success(json!({ "eventId": id, "left": true })))
}

/// POST /api/events/:id/checkin - Body `{ userId? }`; omitted means the caller
pub async fn check_in(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    payload: Option<Json<CheckInRequest>>,
) -> ApiResult<CheckInOutcome> {
    let request = payload.map(|Json(request)| request).unwrap_or_default();
    let outcome = EventService::new(ServiceContext::new(&state))
        .check_in(&actor, id, request)
        .await?;
    Ok(ApiResponse::success(outcome))
}

/// DELETE /api/events/:id/checkin?userId=
pub async fn undo_check_in(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Query(query): Query<UndoCheckInQuery>,
) -> ApiResult<EventParticipant> {
    let participant = EventService::new(ServiceContext::new(&state))
        .undo_check_in(&actor, id, query.user_id)
        .await?;
    Ok(ApiResponse::success(participant))
}

/// GET /api/events/:id/participants?checkedIn=
pub async fn participants(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Query(query): Query<ParticipantsQuery>,
) -> ApiResult<EventParticipants> {
    let participants = EventService::new(ServiceContext::new(&state))
        .participants(&actor, id, query)
        .await?;
    Ok(ApiResponse::success(participants))
}
