use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{AppConfig, Environment};
use crate::database::Store;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{jwt_auth_middleware, optional_auth_middleware, require_super_admin};
use crate::state::AppState;

/// Full application router over `state`
pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        // Tier 1
        .merge(auth_public_routes())
        .merge(catalogue_routes())
        .merge(event_public_routes(state.clone()))
        // Tier 2
        .merge(protected_routes(state.clone()))
        // Tier 3
        .merge(elevated_routes(state.clone()))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.api.request_timeout_secs)))
        .layer(cors_layer(&config))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
}

fn catalogue_routes() -> Router<AppState> {
    use public::clubs;

    Router::new()
        .route("/api/clubs", get(clubs::list))
        .route("/api/clubs/:id", get(clubs::show))
        .route("/api/clubs/:id/courts", get(clubs::courts))
        .route("/api/clubs/:id/courts/:court_id", get(clubs::court))
}

fn event_public_routes(state: AppState) -> Router<AppState> {
    use public::events;

    Router::new()
        .route("/api/events", get(events::list))
        .route("/api/events/nearby", get(events::nearby))
        .route("/api/events/:id", get(events::show))
        .route("/api/events/:id/matches", get(events::matches))
        .route_layer(from_fn_with_state(state, optional_auth_middleware))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{auth, clubs, courts, events, matches, members, users};

    Router::new()
        // Account
        .route("/api/auth/profile", get(auth::profile))
        .route("/api/users/profile", put(auth::update_profile))
        .route("/api/users/:id/matches", get(users::matches))
        // Clubs
        .route("/api/clubs", post(clubs::create))
        .route("/api/clubs/:id", put(clubs::update).delete(clubs::delete))
        .route("/api/clubs/:id/courts", post(courts::create))
        .route(
            "/api/clubs/:id/courts/:court_id",
            put(courts::update).delete(courts::delete),
        )
        .route("/api/clubs/:id/members", get(members::list).post(members::add))
        .route(
            "/api/clubs/:id/members/:user_id",
            put(members::update).delete(members::remove),
        )
        .route(
            "/api/clubs/:id/matches",
            get(matches::club_list).post(matches::club_create),
        )
        .route(
            "/api/clubs/:id/matches/:match_id",
            get(matches::club_show)
                .put(matches::club_update)
                .delete(matches::club_delete),
        )
        // Events
        .route("/api/events", post(events::create))
        .route("/api/events/:id", put(events::update).delete(events::delete))
        .route("/api/events/:id/join", post(events::join).delete(events::leave))
        .route(
            "/api/events/:id/checkin",
            post(events::check_in).delete(events::undo_check_in),
        )
        .route("/api/events/:id/participants", get(events::participants))
        // Informal matches
        .route("/api/matches", get(matches::list).post(matches::create))
        .route(
            "/api/matches/:id",
            get(matches::show).put(matches::update).delete(matches::delete),
        )
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn elevated_routes(state: AppState) -> Router<AppState> {
    use elevated::root::users;

    // Layers run bottom-up: the token is resolved before the role check
    Router::new()
        .route("/api/root/users", get(users::list))
        .route("/api/root/users/:id", get(users::show).delete(users::delete))
        .route_layer(from_fn(require_super_admin))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Courtside API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Club management API for racquet-sport communities",
            "endpoints": {
                "health": "/health (public)",
                "auth": "/auth/register, /auth/login (public - token acquisition)",
                "profile": "/api/auth/profile, /api/users/profile (protected)",
                "clubs": "/api/clubs[/:id] (public reads, protected writes)",
                "courts": "/api/clubs/:id/courts[/:courtId] (public reads, protected writes)",
                "members": "/api/clubs/:id/members[/:userId] (protected)",
                "events": "/api/events[/nearby|/:id[/join|/checkin|/participants|/matches]]",
                "matches": "/api/matches[/:id], /api/clubs/:id/matches[/:matchId] (protected)",
                "users": "/api/users/:id/matches (protected)",
                "root": "/api/root/users[/:id] (super admin)"
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> Response {
    let (status, database) = match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "connected"),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    let body = json!({
        "success": status == StatusCode::OK,
        "data": {
            "status": if status == StatusCode::OK { "healthy" } else { "unhealthy" },
            "timestamp": Utc::now(),
            "database": database,
        }
    });
    (status, Json(body)).into_response()
}
