// handlers/protected/members.rs - /api/clubs/:id/members

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::MemberView;
use crate::database::Page;
use crate::middleware::{ApiResponse, ApiResult};
use crate::policy::Actor;
use crate::services::membership_service::{AddMemberRequest, MemberListQuery, UpdateMemberRequest};
use crate::services::{MembershipService, ServiceContext};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(club_id): Path<Uuid>,
    Query(query): Query<MemberListQuery>,
) -> ApiResult<Page<MemberView>> {
    let members = MembershipService::new(ServiceContext::new(&state))
        .list(&actor, club_id, query)
        .await?;
    Ok(ApiResponse::success(members))
}

pub async fn add(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(club_id): Path<Uuid>,
    Json(payload): Json<AddMemberRequest>,
) -> ApiResult<MemberView> {
    let member = MembershipService::new(ServiceContext::new(&state))
        .add(&actor, club_id, payload)
        .await?;
    Ok(ApiResponse::created(member))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((club_id, user_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateMemberRequest>,
) -> ApiResult<MemberView> {
    let member = MembershipService::new(ServiceContext::new(&state))
        .update(&actor, club_id, user_id, payload)
        .await?;
    Ok(ApiResponse::success(member))
}

/// DELETE /api/clubs/:id/members/:user_id - The creator's row cannot be removed
pub async fn remove(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((club_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Value> {
    MembershipService::new(ServiceContext::new(&state))
        .remove(&actor, club_id, user_id)
        .await?;
    Ok(ApiResponse::success(json!({ "clubId": club_id, "userId": user_id, "removed": true })))
}
