use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{PgStore, MEMBERSHIP_COLUMNS};
use crate::database::models::{MemberView, Membership, MembershipChanges, NewMembership, UserSummary};
use crate::database::pagination::{Page, Pagination};
use crate::database::store::{MembershipStore, StoreResult};
use crate::database::DatabaseError;
use crate::types::MembershipStatus;

#[derive(FromRow)]
struct MemberRow {
    id: Uuid,
    user_id: Uuid,
    club_id: Uuid,
    status: MembershipStatus,
    expires_at: Option<DateTime<Utc>>,
    joined_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_name: String,
    user_email: String,
    user_avatar: Option<String>,
}

impl From<MemberRow> for MemberView {
    fn from(row: MemberRow) -> Self {
        MemberView {
            user: UserSummary {
                id: row.user_id,
                name: row.user_name,
                email: row.user_email,
                avatar: row.user_avatar,
            },
            membership: Membership {
                id: row.id,
                user_id: row.user_id,
                club_id: row.club_id,
                status: row.status,
                expires_at: row.expires_at,
                joined_at: row.joined_at,
                updated_at: row.updated_at,
            },
        }
    }
}

#[async_trait]
impl MembershipStore for PgStore {
    async fn find_membership(&self, user_id: Uuid, club_id: Uuid) -> StoreResult<Option<Membership>> {
        let sql = format!(
            "SELECT {} FROM club_memberships WHERE user_id = $1 AND club_id = $2",
            MEMBERSHIP_COLUMNS
        );
        Ok(sqlx::query_as::<_, Membership>(&sql)
            .bind(user_id)
            .bind(club_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_membership(&self, new: NewMembership) -> StoreResult<Membership> {
        let sql = format!(
            "INSERT INTO club_memberships (id, user_id, club_id, status, expires_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            MEMBERSHIP_COLUMNS
        );
        sqlx::query_as::<_, Membership>(&sql)
            .bind(Uuid::new_v4())
            .bind(new.user_id)
            .bind(new.club_id)
            .bind(new.status)
            .bind(new.expires_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::unique_violation(e, "User is already a member of this club"))
    }

    async fn update_membership(&self, id: Uuid, changes: MembershipChanges) -> StoreResult<Membership> {
        let sql = format!(
            "UPDATE club_memberships SET status = $2, expires_at = $3, updated_at = $4 \
             WHERE id = $1 RETURNING {}",
            MEMBERSHIP_COLUMNS
        );
        sqlx::query_as::<_, Membership>(&sql)
            .bind(id)
            .bind(changes.status)
            .bind(changes.expires_at)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Membership not found".to_string()))
    }

    async fn delete_membership(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM club_memberships WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_members(
        &self,
        club_id: Uuid,
        status: Option<MembershipStatus>,
        page: Pagination,
    ) -> StoreResult<Page<MemberView>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM club_memberships \
             WHERE club_id = $1 AND ($2::membership_status IS NULL OR status = $2)",
        )
        .bind(club_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, MemberRow>(
            "SELECT m.id, m.user_id, m.club_id, m.status, m.expires_at, m.joined_at, m.updated_at, \
                    u.name AS user_name, u.email AS user_email, u.avatar AS user_avatar \
             FROM club_memberships m JOIN users u ON u.id = m.user_id \
             WHERE m.club_id = $1 AND ($2::membership_status IS NULL OR m.status = $2) \
             ORDER BY m.joined_at ASC, m.id LIMIT $3 OFFSET $4",
        )
        .bind(club_id)
        .bind(status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(rows.into_iter().map(MemberView::from).collect(), total, page))
    }

    async fn active_member_ids(&self, club_id: Uuid, user_ids: &[Uuid]) -> StoreResult<Vec<Uuid>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }
        Ok(sqlx::query_scalar(
            "SELECT user_id FROM club_memberships \
             WHERE club_id = $1 AND status = $2 AND user_id = ANY($3)",
        )
        .bind(club_id)
        .bind(MembershipStatus::Active)
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?)
    }
}
