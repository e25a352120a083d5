// handlers/protected/auth.rs - Caller's own account

use axum::{
    extract::{Extension, State},
    Json,
};

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult};
use crate::policy::Actor;
use crate::services::auth_service::UpdateProfileRequest;
use crate::services::{AuthService, ServiceContext};
use crate::state::AppState;

/// GET /api/auth/profile
pub async fn profile(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<User> {
    let user = AuthService::new(ServiceContext::new(&state))
        .profile(&actor)
        .await?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/users/profile - Name, contact details and optional password change
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<User> {
    let user = AuthService::new(ServiceContext::new(&state))
        .update_profile(&actor, payload)
        .await?;
    Ok(ApiResponse::success(user))
}
