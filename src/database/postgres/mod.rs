//! Postgres implementation of the store traits.
//!
//! Runtime-checked `sqlx` queries; filtered listings are built with
//! `sqlx::QueryBuilder` so the count and page queries share one WHERE clause.

use async_trait::async_trait;
use sqlx::PgPool;

use super::manager::DatabaseManager;
use super::store::{Store, StoreResult};

mod clubs;
mod courts;
mod events;
mod matches;
mod memberships;
mod users;

pub(crate) const USER_COLUMNS: &str = "id, email, name, password_hash, phone, city, avatar, \
     dupr_id, dupr_rating, role, created_at, updated_at";

pub(crate) const CLUB_COLUMNS: &str = "id, name, description, address, city, phone, email, \
     website, logo, creator_id, created_at, updated_at";

pub(crate) const COURT_COLUMNS: &str =
    "id, club_id, name, description, is_active, created_at, updated_at";

pub(crate) const MEMBERSHIP_COLUMNS: &str =
    "id, user_id, club_id, status, expires_at, joined_at, updated_at";

pub(crate) const EVENT_COLUMNS: &str = "id, club_id, court_id, title, description, event_type, \
     visibility, status, start_date_time, end_date_time, max_participants, price, created_at, updated_at";

pub(crate) const MATCH_COLUMNS: &str = "id, match_type, start_time, end_time, score, completed, \
     club_id, court_id, event_id, creator_id, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        DatabaseManager::health_check(&self.pool).await
    }
}
