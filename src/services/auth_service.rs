use serde::{Deserialize, Serialize};

use super::{is_email, is_http_url, required_text, ServiceContext, ServiceResult};
use crate::auth::{
    generate_jwt, hash_password, validate_password_strength, verify_password, AuthError, Claims,
};
use crate::database::models::{NewUser, User, UserChanges};
use crate::database::UserStore;
use crate::error::ApiError;
use crate::policy::Actor;
use crate::types::Role;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub city: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub avatar: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub expires_in: u64,
    pub user: User,
}

fn normalize_email(email: &str) -> ServiceResult<String> {
    let email = email.trim().to_lowercase();
    if !is_email(&email) {
        return Err(ApiError::invalid_field("email", "A valid email address is required"));
    }
    Ok(email)
}

pub struct AuthService<'a> {
    ctx: ServiceContext<'a>,
}

impl<'a> AuthService<'a> {
    pub fn new(ctx: ServiceContext<'a>) -> Self {
        Self { ctx }
    }

    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<AuthResponse> {
        let email = normalize_email(&request.email)?;
        let name = required_text("name", &request.name, 100)?;
        validate_password_strength(&request.password)?;

        if self.ctx.store.find_user_by_email(&email).await?.is_some() {
            return Err(ApiError::conflict("Email is already registered"));
        }

        let password_hash = hash_password(&request.password, self.ctx.config.security.bcrypt_cost)?;
        let user = self
            .ctx
            .store
            .create_user(NewUser {
                email,
                name,
                password_hash,
                phone: request.phone,
                city: request.city,
                role: Role::User,
            })
            .await?;

        tracing::info!("Registered user {}", user.id);
        self.issue(user)
    }

    pub async fn login(&self, request: LoginRequest) -> ServiceResult<AuthResponse> {
        let email = request.email.trim().to_lowercase();
        let user = self
            .ctx
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password_hash)? {
            tracing::warn!("Failed login for user {}", user.id);
            return Err(AuthError::InvalidCredentials.into());
        }

        self.issue(user)
    }

    pub async fn profile(&self, actor: &Actor) -> ServiceResult<User> {
        self.ctx
            .store
            .find_user(actor.user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub async fn update_profile(
        &self,
        actor: &Actor,
        request: UpdateProfileRequest,
    ) -> ServiceResult<User> {
        let current = self.profile(actor).await?;
        let mut changes = UserChanges::default();

        if let Some(name) = &request.name {
            changes.name = Some(required_text("name", name, 100)?);
        }
        if let Some(email) = &request.email {
            let email = normalize_email(email)?;
            if email != current.email {
                if let Some(other) = self.ctx.store.find_user_by_email(&email).await? {
                    if other.id != current.id {
                        return Err(ApiError::conflict("Email is already registered"));
                    }
                }
                changes.email = Some(email);
            }
        }
        if let Some(avatar) = &request.avatar {
            if !is_http_url(avatar) {
                return Err(ApiError::invalid_field("avatar", "Avatar must be an http(s) URL"));
            }
            changes.avatar = Some(avatar.clone());
        }
        changes.phone = request.phone;
        changes.city = request.city;

        if let Some(new_password) = &request.new_password {
            let current_password = request
                .current_password
                .as_deref()
                .ok_or_else(|| ApiError::unauthorized("Current password is required"))?;
            if !verify_password(current_password, &current.password_hash)? {
                return Err(ApiError::unauthorized("Current password is incorrect"));
            }
            validate_password_strength(new_password)?;
            changes.password_hash =
                Some(hash_password(new_password, self.ctx.config.security.bcrypt_cost)?);
        }

        Ok(self.ctx.store.update_user(current.id, changes).await?)
    }

    fn issue(&self, user: User) -> ServiceResult<AuthResponse> {
        let security = &self.ctx.config.security;
        let claims = Claims::new(user.id, user.email.clone(), user.role, security.jwt_expiry_hours);
        let token = generate_jwt(&claims, security)?;
        Ok(AuthResponse {
            token,
            expires_in: security.jwt_expiry_hours * 3600,
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::validate_jwt;
    use crate::services::testing::state;

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "rally1234".to_string(),
            name: "Dana".to_string(),
            city: Some("Austin".to_string()),
            phone: None,
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let state = state();
        let service = AuthService::new(ServiceContext::new(&state));

        let registered = service.register(register_request("Dana@Example.com")).await.unwrap();
        assert_eq!(registered.user.email, "dana@example.com");
        assert_eq!(registered.user.role, Role::User);

        let claims = validate_jwt(&registered.token, &state.config.security).unwrap();
        assert_eq!(claims.sub, registered.user.id);

        let logged_in = service
            .login(LoginRequest {
                email: "dana@example.com".to_string(),
                password: "rally1234".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let state = state();
        let service = AuthService::new(ServiceContext::new(&state));
        service.register(register_request("dana@example.com")).await.unwrap();

        let err = service.register(register_request("dana@example.com")).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let state = state();
        let service = AuthService::new(ServiceContext::new(&state));
        service.register(register_request("dana@example.com")).await.unwrap();

        for (email, password) in [("dana@example.com", "wrong1234"), ("nobody@example.com", "rally1234")] {
            let err = service
                .login(LoginRequest {
                    email: email.to_string(),
                    password: password.to_string(),
                })
                .await
                .unwrap_err();
            assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
            assert_eq!(err.message(), "Invalid credentials");
        }
    }

    #[tokio::test]
    async fn password_change_requires_current_password() {
        let state = state();
        let service = AuthService::new(ServiceContext::new(&state));
        let registered = service.register(register_request("dana@example.com")).await.unwrap();
        let actor = Actor {
            user_id: registered.user.id,
            email: registered.user.email.clone(),
            role: Role::User,
        };

        let err = service
            .update_profile(
                &actor,
                UpdateProfileRequest {
                    new_password: Some("volley5678".to_string()),
                    current_password: Some("nope".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);

        service
            .update_profile(
                &actor,
                UpdateProfileRequest {
                    name: Some("Dana R".to_string()),
                    new_password: Some("volley5678".to_string()),
                    current_password: Some("rally1234".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let relogin = service
            .login(LoginRequest {
                email: "dana@example.com".to_string(),
                password: "volley5678".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(relogin.user.name, "Dana R");
    }
}
