use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{PgStore, COURT_COLUMNS};
use crate::database::models::{Court, CourtChanges, CourtDeletion, NewCourt};
use crate::database::pagination::{Page, Pagination};
use crate::database::store::{CourtStore, StoreResult};
use crate::database::DatabaseError;
use crate::types::EventStatus;

const NAME_TAKEN: &str = "A court with this name already exists in this club";

#[async_trait]
impl CourtStore for PgStore {
    async fn create_court(&self, new: NewCourt) -> StoreResult<Court> {
        let sql = format!(
            "INSERT INTO courts (id, club_id, name, description, is_active) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            COURT_COLUMNS
        );
        sqlx::query_as::<_, Court>(&sql)
            .bind(Uuid::new_v4())
            .bind(new.club_id)
            .bind(&new.name)
            .bind(&new.description)
            .bind(new.is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::unique_violation(e, NAME_TAKEN))
    }

    async fn find_court(&self, id: Uuid) -> StoreResult<Option<Court>> {
        let sql = format!("SELECT {} FROM courts WHERE id = $1", COURT_COLUMNS);
        Ok(sqlx::query_as::<_, Court>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_court_by_name(&self, club_id: Uuid, name: &str) -> StoreResult<Option<Court>> {
        let sql = format!(
            "SELECT {} FROM courts WHERE club_id = $1 AND name = $2",
            COURT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Court>(&sql)
            .bind(club_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_courts(
        &self,
        club_id: Uuid,
        is_active: Option<bool>,
        page: Pagination,
    ) -> StoreResult<Page<Court>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM courts WHERE club_id = $1 AND ($2::BOOLEAN IS NULL OR is_active = $2)",
        )
        .bind(club_id)
        .bind(is_active)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            "SELECT {} FROM courts \
             WHERE club_id = $1 AND ($2::BOOLEAN IS NULL OR is_active = $2) \
             ORDER BY is_active DESC, name ASC LIMIT $3 OFFSET $4",
            COURT_COLUMNS
        );
        let courts = sqlx::query_as::<_, Court>(&sql)
            .bind(club_id)
            .bind(is_active)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(Page::new(courts, total, page))
    }

    async fn update_court(&self, id: Uuid, changes: CourtChanges) -> StoreResult<Court> {
        let sql = format!(
            "UPDATE courts SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                is_active = COALESCE($4, is_active), \
                updated_at = $5 \
             WHERE id = $1 RETURNING {}",
            COURT_COLUMNS
        );
        sqlx::query_as::<_, Court>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.description)
            .bind(changes.is_active)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::unique_violation(e, NAME_TAKEN))?
            .ok_or_else(|| DatabaseError::NotFound("Court not found".to_string()))
    }

    async fn delete_court(&self, id: Uuid) -> StoreResult<CourtDeletion> {
        let mut tx = self.pool.begin().await?;

        let events_deleted: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE court_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        let matches_deleted: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM matches WHERE court_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM courts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Court not found".to_string()));
        }

        tx.commit().await?;
        Ok(CourtDeletion {
            events_deleted,
            matches_deleted,
        })
    }

    async fn count_future_events(&self, court_id: Uuid, now: DateTime<Utc>) -> StoreResult<i64> {
        Ok(sqlx::query_scalar(
            "SELECT COUNT(*) FROM events \
             WHERE court_id = $1 AND status IN ($2, $3) AND end_date_time >= $4",
        )
        .bind(court_id)
        .bind(EventStatus::Scheduled)
        .bind(EventStatus::Ongoing)
        .bind(now)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn count_incomplete_matches(&self, court_id: Uuid) -> StoreResult<i64> {
        Ok(sqlx::query_scalar(
            "SELECT COUNT(*) FROM matches WHERE court_id = $1 AND completed = FALSE",
        )
        .bind(court_id)
        .fetch_one(&self.pool)
        .await?)
    }
}
