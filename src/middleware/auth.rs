use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{validate_jwt, AuthError};
use crate::database::UserStore;
use crate::error::ApiError;
use crate::policy::Actor;
use crate::state::AppState;

/// JWT authentication middleware: verifies the bearer token, confirms the
/// user still exists and injects the resolved [`Actor`] into the request.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers)?;
    let actor = resolve_actor(&state, &token).await?;

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

/// Like [`jwt_auth_middleware`] but lets anonymous requests through.
/// A token that is present must still be valid.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if headers.contains_key("authorization") {
        let token = extract_jwt_from_headers(&headers)?;
        let actor = resolve_actor(&state, &token).await?;
        request.extensions_mut().insert(actor);
    }
    Ok(next.run(request).await)
}

/// Elevated tier gate; must run after [`jwt_auth_middleware`]
pub async fn require_super_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    match request.extensions().get::<Actor>() {
        Some(actor) if actor.is_super_admin() => Ok(next.run(request).await),
        Some(actor) => {
            tracing::warn!("User {} denied elevated access", actor.user_id);
            Err(ApiError::forbidden("Super admin access required"))
        }
        None => Err(ApiError::unauthorized("Authentication required")),
    }
}

async fn resolve_actor(state: &AppState, token: &str) -> Result<Actor, ApiError> {
    let claims = validate_jwt(token, &state.config.security)?;

    // Role comes from the row so demotions apply to live tokens
    let user = state
        .store
        .find_user(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

    Ok(Actor {
        user_id: user.id,
        email: user.email,
        role: user.role,
    })
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| AuthError::MissingToken("Missing Authorization header".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid Authorization header format".to_string()))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if token.trim().is_empty() => {
            Err(AuthError::MissingToken("Empty JWT token".to_string()))
        }
        Some(token) => Ok(token.trim().to_string()),
        None => Err(AuthError::InvalidToken(
            "Authorization header must use Bearer token format".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(extract_jwt_from_headers(&headers("Bearer abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn malformed_headers_are_rejected() {
        assert!(matches!(
            extract_jwt_from_headers(&HeaderMap::new()),
            Err(AuthError::MissingToken(_))
        ));
        assert!(matches!(
            extract_jwt_from_headers(&headers("Bearer   ")),
            Err(AuthError::MissingToken(_))
        ));
        assert!(matches!(
            extract_jwt_from_headers(&headers("Basic dXNlcjpwYXNz")),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
