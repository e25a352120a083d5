use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::{PgStore, USER_COLUMNS};
use crate::database::models::{NewUser, User, UserChanges, UserFilter};
use crate::database::pagination::{Page, Pagination};
use crate::database::store::{StoreResult, UserStore};
use crate::database::DatabaseError;

const EMAIL_TAKEN: &str = "Email is already registered";

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search.to_lowercase());
        query.push(" AND (LOWER(name) LIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR LOWER(email) LIKE ");
        query.push_bind(pattern);
        query.push(")");
    }
    if let Some(city) = &filter.city {
        query.push(" AND city ILIKE ");
        query.push_bind(format!("%{}%", city));
    }
    if let Some(role) = filter.role {
        query.push(" AND role = ");
        query.push_bind(role);
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (id, email, name, password_hash, phone, city, role) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.email)
            .bind(&new.name)
            .bind(&new.password_hash)
            .bind(&new.phone)
            .bind(&new.city)
            .bind(new.role)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::unique_violation(e, EMAIL_TAKEN))
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<User> {
        let sql = format!(
            "UPDATE users SET \
                email = COALESCE($2, email), \
                name = COALESCE($3, name), \
                password_hash = COALESCE($4, password_hash), \
                phone = COALESCE($5, phone), \
                city = COALESCE($6, city), \
                avatar = COALESCE($7, avatar), \
                dupr_id = COALESCE($8, dupr_id), \
                updated_at = $9 \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.email)
            .bind(changes.name)
            .bind(changes.password_hash)
            .bind(changes.phone)
            .bind(changes.city)
            .bind(changes.avatar)
            .bind(changes.dupr_id)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::unique_violation(e, EMAIL_TAKEN))?
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    DatabaseError::Conflict("User still owns clubs".to_string())
                }
                _ => DatabaseError::Sqlx(e),
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_users(&self, filter: &UserFilter, page: Pagination) -> StoreResult<Page<User>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users WHERE 1=1");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM users WHERE 1=1", USER_COLUMNS));
        push_filters(&mut query, filter);
        query.push(" ORDER BY created_at DESC, id LIMIT ");
        query.push_bind(page.limit());
        query.push(" OFFSET ");
        query.push_bind(page.offset());

        let users = query.build_query_as::<User>().fetch_all(&self.pool).await?;
        Ok(Page::new(users, total, page))
    }

    async fn count_clubs_created(&self, user_id: Uuid) -> StoreResult<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM clubs WHERE creator_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn existing_user_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Uuid>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        Ok(sqlx::query_scalar("SELECT id FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }
}
