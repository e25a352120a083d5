// handlers/protected/courts.rs - /api/clubs/:id/courts writes

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use uuid::Uuid;

use crate::database::models::{Court, CourtDeletion};
use crate::middleware::{ApiResponse, ApiResult};
use crate::policy::Actor;
use crate::services::court_service::{CreateCourtRequest, UpdateCourtRequest};
use crate::services::{CourtService, ServiceContext};
use crate::state::AppState;

pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(club_id): Path<Uuid>,
    Json(payload): Json<CreateCourtRequest>,
) -> ApiResult<Court> {
    let court = CourtService::new(ServiceContext::new(&state))
        .create(&actor, club_id, payload)
        .await?;
    Ok(ApiResponse::created(court))
}

/// PUT /api/clubs/:id/courts/:court_id - Deactivation is blocked by upcoming events
pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((club_id, court_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateCourtRequest>,
) -> ApiResult<Court> {
    let court = CourtService::new(ServiceContext::new(&state))
        .update(&actor, club_id, court_id, payload)
        .await?;
    Ok(ApiResponse::success(court))
}

/// DELETE /api/clubs/:id/courts/:court_id - Reports what was cascaded
pub async fn delete(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((club_id, court_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<CourtDeletion> {
    let deletion = CourtService::new(ServiceContext::new(&state))
        .delete(&actor, club_id, court_id)
        .await?;
    Ok(ApiResponse::success(deletion))
}
