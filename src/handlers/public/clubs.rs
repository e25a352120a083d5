// handlers/public/clubs.rs - Club and court catalogue

use axum::extract::{Path, Query, State};
use uuid::Uuid;

use crate::database::models::Court;
use crate::database::Page;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::club_service::{ClubDetail, ClubListItem, ClubListQuery};
use crate::services::court_service::CourtListQuery;
use crate::services::{ClubService, CourtService, ServiceContext};
use crate::state::AppState;

/// GET /api/clubs - Newest first, filters `city` and `search`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ClubListQuery>,
) -> ApiResult<Page<ClubListItem>> {
    let clubs = ClubService::new(ServiceContext::new(&state)).list(query).await?;
    Ok(ApiResponse::success(clubs))
}

/// GET /api/clubs/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<ClubDetail> {
    let club = ClubService::new(ServiceContext::new(&state)).get(id).await?;
    Ok(ApiResponse::success(club))
}

/// GET /api/clubs/:id/courts
pub async fn courts(
    State(state): State<AppState>,
    Path(club_id): Path<Uuid>,
    Query(query): Query<CourtListQuery>,
) -> ApiResult<Page<Court>> {
    let courts = CourtService::new(ServiceContext::new(&state))
        .list(club_id, query)
        .await?;
    Ok(ApiResponse::success(courts))
}

/// GET /api/clubs/:id/courts/:court_id
pub async fn court(
    State(state): State<AppState>,
    Path((club_id, court_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Court> {
    let court = CourtService::new(ServiceContext::new(&state))
        .get(club_id, court_id)
        .await?;
    Ok(ApiResponse::success(court))
}
