use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::types::Role;

pub mod password;

pub use password::{hash_password, validate_password_strength, verify_password};

/// Errors raised while issuing or checking credentials
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    MissingToken(String),

    #[error("{0}")]
    InvalidToken(String),

    #[error("{0}")]
    WeakPassword(String),

    #[error("JWT secret not configured")]
    MissingSecret,

    #[error(transparent)]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Hash(#[from] bcrypt::BcryptError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: String, role: Role, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            email,
            role,
            iat: now.timestamp(),
            exp,
        }
    }
}

pub fn generate_jwt(claims: &Claims, security: &SecurityConfig) -> Result<String, AuthError> {
    let secret = &security.jwt_secret;

    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    Ok(encode(&Header::default(), claims, &encoding_key)?)
}

/// Validate a bearer token and extract its claims
pub fn validate_jwt(token: &str, security: &SecurityConfig) -> Result<Claims, AuthError> {
    let secret = &security.jwt_secret;

    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| AuthError::InvalidToken(format!("Invalid JWT token: {}", e)))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn issued_token_round_trips_claims() {
        let security = AppConfig::development().security;
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "ana@example.com".into(), Role::User, 1);

        let token = generate_jwt(&claims, &security).unwrap();
        let decoded = validate_jwt(&token, &security).unwrap();

        assert_eq!(decoded.sub, user_id);
        assert_eq!(decoded.role, Role::User);
        assert_eq!(decoded.exp - decoded.iat, 3600);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let mut security = AppConfig::development().security;
        let claims = Claims::new(Uuid::new_v4(), "x@example.com".into(), Role::SuperAdmin, 1);
        let token = generate_jwt(&claims, &security).unwrap();

        security.jwt_secret = "another-secret".into();
        assert!(matches!(validate_jwt(&token, &security), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn empty_secret_refuses_to_sign() {
        let mut security = AppConfig::development().security;
        security.jwt_secret.clear();
        let claims = Claims::new(Uuid::new_v4(), "x@example.com".into(), Role::User, 1);
        assert!(matches!(generate_jwt(&claims, &security), Err(AuthError::MissingSecret)));
    }
}
