// handlers/protected/users.rs - GET /api/users/:id/matches

use axum::extract::{Extension, Path, Query, State};
use uuid::Uuid;

use crate::middleware::{ApiResponse, ApiResult};
use crate::policy::Actor;
use crate::services::user_service::{UserMatches, UserMatchesQuery};
use crate::services::{ServiceContext, UserService};
use crate::state::AppState;

pub async fn matches(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<UserMatchesQuery>,
) -> ApiResult<UserMatches> {
    let matches = UserService::new(ServiceContext::new(&state))
        .matches(&actor, user_id, query)
        .await?;
    Ok(ApiResponse::success(matches))
}
