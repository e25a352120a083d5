// handlers/protected/clubs.rs - Club writes

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::Club;
use crate::middleware::{ApiResponse, ApiResult};
use crate::policy::Actor;
use crate::services::club_service::{CreateClubRequest, UpdateClubRequest};
use crate::services::{ClubService, ServiceContext};
use crate::state::AppState;

/// POST /api/clubs - Caller becomes creator with an ACTIVE membership
pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreateClubRequest>,
) -> ApiResult<Club> {
    let club = ClubService::new(ServiceContext::new(&state))
        .create(&actor, payload)
        .await?;
    Ok(ApiResponse::created(club))
}

/// PUT /api/clubs/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClubRequest>,
) -> ApiResult<Club> {
    let club = ClubService::new(ServiceContext::new(&state))
        .update(&actor, id, payload)
        .await?;
    Ok(ApiResponse::success(club))
}

/// DELETE /api/clubs/:id - Cascades to courts, memberships, events and matches
pub async fn delete(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    ClubService::new(ServiceContext::new(&state))
        .delete(&actor, id)
        .await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
