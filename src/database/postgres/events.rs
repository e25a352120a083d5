use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use super::{PgStore, EVENT_COLUMNS};
use crate::database::models::{
    CheckInOutcome, Event, EventChanges, EventFilter, EventParticipant, NewEvent, ParticipantView,
    UserSummary,
};
use crate::database::pagination::{Page, Pagination};
use crate::database::store::{EventStore, StoreResult};
use crate::database::DatabaseError;
use crate::guards;
use crate::types::{EventStatus, EventVisibility};

const PARTICIPANT_COLUMNS: &str = "id, event_id, user_id, checked_in, check_in_time, joined_at";

fn not_registered() -> DatabaseError {
    DatabaseError::NotFound("User is not registered for this event".to_string())
}

/// Reads the event under a row lock held until the transaction ends
async fn lock_event(tx: &mut Transaction<'_, Postgres>, event_id: Uuid) -> StoreResult<Event> {
    let sql = format!("SELECT {} FROM events WHERE id = $1 FOR UPDATE", EVENT_COLUMNS);
    sqlx::query_as::<_, Event>(&sql)
        .bind(event_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Event not found".to_string()))
}

async fn lock_participant(
    tx: &mut Transaction<'_, Postgres>,
    event_id: Uuid,
    user_id: Uuid,
) -> StoreResult<Option<EventParticipant>> {
    let sql = format!(
        "SELECT {} FROM event_participants WHERE event_id = $1 AND user_id = $2 FOR UPDATE",
        PARTICIPANT_COLUMNS
    );
    Ok(sqlx::query_as::<_, EventParticipant>(&sql)
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?)
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &EventFilter) {
    if let Some(club_id) = filter.club_id {
        query.push(" AND club_id = ");
        query.push_bind(club_id);
    }
    if let Some(event_type) = filter.event_type {
        query.push(" AND event_type = ");
        query.push_bind(event_type);
    }
    if let Some(status) = filter.status {
        query.push(" AND status = ");
        query.push_bind(status);
    }
    if let Some(visibility) = filter.visibility {
        query.push(" AND visibility = ");
        query.push_bind(visibility);
    }
    if filter.exclude_private {
        query.push(" AND visibility <> ");
        query.push_bind(EventVisibility::Private);
    }
    if let Some(after) = filter.starts_after {
        query.push(" AND start_date_time >= ");
        query.push_bind(after);
    }
    if let Some(before) = filter.starts_before {
        query.push(" AND start_date_time <= ");
        query.push_bind(before);
    }
    if let Some(city) = &filter.city {
        query.push(" AND club_id IN (SELECT id FROM clubs WHERE city ILIKE ");
        query.push_bind(format!("%{}%", city));
        query.push(")");
    }
}

#[derive(FromRow)]
struct ParticipantRow {
    id: Uuid,
    event_id: Uuid,
    user_id: Uuid,
    checked_in: bool,
    check_in_time: Option<DateTime<Utc>>,
    joined_at: DateTime<Utc>,
    user_name: String,
    user_email: String,
    user_avatar: Option<String>,
}

impl From<ParticipantRow> for ParticipantView {
    fn from(row: ParticipantRow) -> Self {
        ParticipantView {
            user: UserSummary {
                id: row.user_id,
                name: row.user_name,
                email: row.user_email,
                avatar: row.user_avatar,
            },
            participant: EventParticipant {
                id: row.id,
                event_id: row.event_id,
                user_id: row.user_id,
                checked_in: row.checked_in,
                check_in_time: row.check_in_time,
                joined_at: row.joined_at,
            },
        }
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn create_event(&self, new: NewEvent) -> StoreResult<Event> {
        let sql = format!(
            "INSERT INTO events (id, club_id, court_id, title, description, event_type, visibility, \
                status, start_date_time, end_date_time, max_participants, price) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING {}",
            EVENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Event>(&sql)
            .bind(Uuid::new_v4())
            .bind(new.club_id)
            .bind(new.court_id)
            .bind(&new.title)
            .bind(&new.description)
            .bind(new.event_type)
            .bind(new.visibility)
            .bind(EventStatus::Scheduled)
            .bind(new.start_date_time)
            .bind(new.end_date_time)
            .bind(new.max_participants)
            .bind(new.price)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_event(&self, id: Uuid) -> StoreResult<Option<Event>> {
        let sql = format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS);
        Ok(sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_event(&self, id: Uuid, changes: EventChanges) -> StoreResult<Event> {
        let sql = format!(
            "UPDATE events SET court_id = $2, title = $3, description = $4, event_type = $5, \
                visibility = $6, status = $7, start_date_time = $8, end_date_time = $9, \
                max_participants = $10, price = $11, updated_at = $12 \
             WHERE id = $1 RETURNING {}",
            EVENT_COLUMNS
        );
        sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .bind(changes.court_id)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.event_type)
            .bind(changes.visibility)
            .bind(changes.status)
            .bind(changes.start_date_time)
            .bind(changes.end_date_time)
            .bind(changes.max_participants)
            .bind(changes.price)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Event not found".to_string()))
    }

    async fn delete_event(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_events(&self, filter: &EventFilter, page: Pagination) -> StoreResult<Page<Event>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM events WHERE 1=1");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM events WHERE 1=1", EVENT_COLUMNS));
        push_filters(&mut query, filter);
        query.push(" ORDER BY start_date_time ASC, id LIMIT ");
        query.push_bind(page.limit());
        query.push(" OFFSET ");
        query.push_bind(page.offset());

        let events = query.build_query_as::<Event>().fetch_all(&self.pool).await?;
        Ok(Page::new(events, total, page))
    }

    async fn count_participants(&self, event_id: Uuid) -> StoreResult<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM event_participants WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_participant(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<Option<EventParticipant>> {
        let sql = format!(
            "SELECT {} FROM event_participants WHERE event_id = $1 AND user_id = $2",
            PARTICIPANT_COLUMNS
        );
        Ok(sqlx::query_as::<_, EventParticipant>(&sql)
            .bind(event_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn join_event(&self, event_id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> StoreResult<EventParticipant> {
        let mut tx = self.pool.begin().await?;
        let event = lock_event(&mut tx, event_id).await?;

        let registered: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM event_participants WHERE event_id = $1 AND user_id = $2)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM event_participants WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(&mut *tx)
            .await?;
        guards::event::can_join(&event, registered, count, now)?;

        let sql = format!(
            "INSERT INTO event_participants (id, event_id, user_id) VALUES ($1, $2, $3) RETURNING {}",
            PARTICIPANT_COLUMNS
        );
        let participant = sqlx::query_as::<_, EventParticipant>(&sql)
            .bind(Uuid::new_v4())
            .bind(event_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(participant)
    }

    async fn leave_event(&self, event_id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;
        let event = lock_event(&mut tx, event_id).await?;
        if lock_participant(&mut tx, event_id, user_id).await?.is_none() {
            return Ok(false);
        }
        guards::event::can_leave(&event, now)?;

        sqlx::query("DELETE FROM event_participants WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn check_in(&self, event_id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> StoreResult<CheckInOutcome> {
        let mut tx = self.pool.begin().await?;
        let event = lock_event(&mut tx, event_id).await?;
        let participant = lock_participant(&mut tx, event_id, user_id)
            .await?
            .ok_or_else(not_registered)?;
        guards::event::can_check_in(&event, &participant, now)?;

        let sql = format!(
            "UPDATE event_participants SET checked_in = TRUE, check_in_time = $3 \
             WHERE event_id = $1 AND user_id = $2 RETURNING {}",
            PARTICIPANT_COLUMNS
        );
        let participant = sqlx::query_as::<_, EventParticipant>(&sql)
            .bind(event_id)
            .bind(user_id)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        // Only the first check-in of a scheduled event starts it
        sqlx::query("UPDATE events SET status = $2, updated_at = $3 WHERE id = $1 AND status = $4")
            .bind(event_id)
            .bind(EventStatus::Ongoing)
            .bind(now)
            .bind(EventStatus::Scheduled)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(CheckInOutcome {
            participant,
            event_status: guards::event::status_after_check_in(event.status),
        })
    }

    async fn undo_check_in(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<EventParticipant> {
        let mut tx = self.pool.begin().await?;
        let event = lock_event(&mut tx, event_id).await?;
        let participant = lock_participant(&mut tx, event_id, user_id)
            .await?
            .ok_or_else(not_registered)?;
        guards::event::can_undo_check_in(&event, &participant)?;

        let sql = format!(
            "UPDATE event_participants SET checked_in = FALSE, check_in_time = NULL \
             WHERE event_id = $1 AND user_id = $2 RETURNING {}",
            PARTICIPANT_COLUMNS
        );
        let participant = sqlx::query_as::<_, EventParticipant>(&sql)
            .bind(event_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(participant)
    }

    async fn list_participants(
        &self,
        event_id: Uuid,
        checked_in: Option<bool>,
    ) -> StoreResult<Vec<ParticipantView>> {
        let rows = sqlx::query_as::<_, ParticipantRow>(
            "SELECT p.id, p.event_id, p.user_id, p.checked_in, p.check_in_time, p.joined_at, \
                    u.name AS user_name, u.email AS user_email, u.avatar AS user_avatar \
             FROM event_participants p JOIN users u ON u.id = p.user_id \
             WHERE p.event_id = $1 AND ($2::BOOLEAN IS NULL OR p.checked_in = $2) \
             ORDER BY p.joined_at ASC, p.id",
        )
        .bind(event_id)
        .bind(checked_in)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ParticipantView::from).collect())
    }
}
