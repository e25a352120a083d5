// handlers/protected/matches.rs - Informal (/api/matches) and club (/api/clubs/:id/matches) matches

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::MatchDetail;
use crate::database::Page;
use crate::middleware::{ApiResponse, ApiResult};
use crate::policy::Actor;
use crate::services::match_service::{
    ClubMatchListQuery, CreateMatchRequest, MatchListQuery, UpdateMatchRequest,
};
use crate::services::{MatchService, ServiceContext};
use crate::state::AppState;

// Informal

pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreateMatchRequest>,
) -> ApiResult<MatchDetail> {
    let detail = MatchService::new(ServiceContext::new(&state))
        .create_informal(&actor, payload)
        .await?;
    Ok(ApiResponse::created(detail))
}

/// GET /api/matches - Matches the caller created or plays in
pub async fn list(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<MatchListQuery>,
) -> ApiResult<Page<MatchDetail>> {
    let matches = MatchService::new(ServiceContext::new(&state))
        .list_for_actor(&actor, query)
        .await?;
    Ok(ApiResponse::success(matches))
}

pub async fn show(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> ApiResult<MatchDetail> {
    let detail = MatchService::new(ServiceContext::new(&state))
        .get(&actor, id)
        .await?;
    Ok(ApiResponse::success(detail))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMatchRequest>,
) -> ApiResult<MatchDetail> {
    let detail = MatchService::new(ServiceContext::new(&state))
        .update(&actor, id, payload)
        .await?;
    Ok(ApiResponse::success(detail))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    MatchService::new(ServiceContext::new(&state))
        .delete(&actor, id)
        .await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}

// Club

pub async fn club_create(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(club_id): Path<Uuid>,
    Json(payload): Json<CreateMatchRequest>,
) -> ApiResult<MatchDetail> {
    let detail = MatchService::new(ServiceContext::new(&state))
        .create_for_club(&actor, club_id, payload)
        .await?;
    Ok(ApiResponse::created(detail))
}

pub async fn club_list(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(club_id): Path<Uuid>,
    Query(query): Query<ClubMatchListQuery>,
) -> ApiResult<Page<MatchDetail>> {
    let matches = MatchService::new(ServiceContext::new(&state))
        .list_for_club(&actor, club_id, query)
        .await?;
    Ok(ApiResponse::success(matches))
}

pub async fn club_show(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<MatchDetail> {
    let detail = MatchService::new(ServiceContext::new(&state))
        .get_in_club(&actor, club_id, id)
        .await?;
    Ok(ApiResponse::success(detail))
}

pub async fn club_update(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateMatchRequest>,
) -> ApiResult<MatchDetail> {
    let detail = MatchService::new(ServiceContext::new(&state))
        .update_in_club(&actor, club_id, id, payload)
        .await?;
    Ok(ApiResponse::success(detail))
}

pub async fn club_delete(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Value> {
    MatchService::new(ServiceContext::new(&state))
        .delete_in_club(&actor, club_id, id)
        .await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
