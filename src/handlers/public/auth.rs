// handlers/public/auth.rs - POST /auth/register, POST /auth/login

use axum::{extract::State, Json};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::auth_service::{AuthResponse, LoginRequest, RegisterRequest};
use crate::services::{AuthService, ServiceContext};
use crate::state::AppState;

/// POST /auth/register - Create a USER account and return a token
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<AuthResponse> {
    let response = AuthService::new(ServiceContext::new(&state))
        .register(payload)
        .await?;
    Ok(ApiResponse::created(response))
}

/// POST /auth/login - Exchange credentials for a token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let response = AuthService::new(ServiceContext::new(&state))
        .login(payload)
        .await?;
    Ok(ApiResponse::success(response))
}
