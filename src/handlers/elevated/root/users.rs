// handlers/elevated/root/users.rs - /api/root/users

use axum::extract::{Extension, Path, Query, State};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::User;
use crate::database::Page;
use crate::middleware::{ApiResponse, ApiResult};
use crate::policy::Actor;
use crate::services::user_service::UserListQuery;
use crate::services::{ServiceContext, UserService};
use crate::state::AppState;

/// GET /api/root/users?search=&city=&role=
pub async fn list(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<Page<User>> {
    let users = UserService::new(ServiceContext::new(&state))
        .list(&actor, query)
        .await?;
    Ok(ApiResponse::success(users))
}

pub async fn show(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> ApiResult<User> {
    let user = UserService::new(ServiceContext::new(&state))
        .get(&actor, id)
        .await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /api/root/users/:id - Not self, and not a user who still owns clubs
pub async fn delete(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    UserService::new(ServiceContext::new(&state))
        .delete(&actor, id)
        .await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
