use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::{PgStore, CLUB_COLUMNS};
use crate::database::models::{Club, ClubChanges, ClubFilter, NewClub};
use crate::database::pagination::{Page, Pagination};
use crate::database::store::{ClubStore, StoreResult};
use crate::database::DatabaseError;
use crate::types::MembershipStatus;

const NAME_TAKEN: &str = "A club with this name already exists in this city";

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &ClubFilter) {
    if let Some(city) = &filter.city {
        query.push(" AND city ILIKE ");
        query.push_bind(format!("%{}%", city));
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        query.push(" AND (name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR description ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }
}

#[async_trait]
impl ClubStore for PgStore {
    async fn create_club(&self, new: NewClub) -> StoreResult<Club> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let sql = format!(
            "INSERT INTO clubs (id, name, description, address, city, phone, email, website, logo, \
                creator_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11) RETURNING {}",
            CLUB_COLUMNS
        );
        let club = sqlx::query_as::<_, Club>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.name)
            .bind(&new.description)
            .bind(&new.address)
            .bind(&new.city)
            .bind(&new.phone)
            .bind(&new.email)
            .bind(&new.website)
            .bind(&new.logo)
            .bind(new.creator_id)
            .bind(now)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| DatabaseError::unique_violation(e, NAME_TAKEN))?;

        sqlx::query(
            "INSERT INTO club_memberships (id, user_id, club_id, status, joined_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(club.creator_id)
        .bind(club.id)
        .bind(MembershipStatus::Active)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(club)
    }

    async fn find_club(&self, id: Uuid) -> StoreResult<Option<Club>> {
        let sql = format!("SELECT {} FROM clubs WHERE id = $1", CLUB_COLUMNS);
        Ok(sqlx::query_as::<_, Club>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_club_by_name_and_city(&self, name: &str, city: &str) -> StoreResult<Option<Club>> {
        let sql = format!("SELECT {} FROM clubs WHERE name = $1 AND city = $2", CLUB_COLUMNS);
        Ok(sqlx::query_as::<_, Club>(&sql)
            .bind(name)
            .bind(city)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_club(&self, id: Uuid, changes: ClubChanges) -> StoreResult<Club> {
        let sql = format!(
            "UPDATE clubs SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                address = COALESCE($4, address), \
                city = COALESCE($5, city), \
                phone = COALESCE($6, phone), \
                email = COALESCE($7, email), \
                website = COALESCE($8, website), \
                logo = COALESCE($9, logo), \
                updated_at = $10 \
             WHERE id = $1 RETURNING {}",
            CLUB_COLUMNS
        );
        sqlx::query_as::<_, Club>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.description)
            .bind(changes.address)
            .bind(changes.city)
            .bind(changes.phone)
            .bind(changes.email)
            .bind(changes.website)
            .bind(changes.logo)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::unique_violation(e, NAME_TAKEN))?
            .ok_or_else(|| DatabaseError::NotFound("Club not found".to_string()))
    }

    async fn delete_club(&self, id: Uuid) -> StoreResult<bool> {
        // Courts, memberships, events and matches go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM clubs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_clubs(&self, filter: &ClubFilter, page: Pagination) -> StoreResult<Page<Club>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM clubs WHERE 1=1");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM clubs WHERE 1=1", CLUB_COLUMNS));
        push_filters(&mut query, filter);
        query.push(" ORDER BY created_at DESC, id LIMIT ");
        query.push_bind(page.limit());
        query.push(" OFFSET ");
        query.push_bind(page.offset());

        let clubs = query.build_query_as::<Club>().fetch_all(&self.pool).await?;
        Ok(Page::new(clubs, total, page))
    }

    async fn count_members(&self, club_id: Uuid) -> StoreResult<i64> {
        Ok(sqlx::query_scalar(
            "SELECT COUNT(*) FROM club_memberships WHERE club_id = $1 AND status = $2",
        )
        .bind(club_id)
        .bind(MembershipStatus::Active)
        .fetch_one(&self.pool)
        .await?)
    }
}
