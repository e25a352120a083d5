use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{FromRow, PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{PgStore, MATCH_COLUMNS};
use crate::database::models::{
    Match, MatchChanges, MatchDetail, MatchFilter, MatchKind, MatchParticipant,
    MatchParticipantView, MatchStats, NewMatch, ParticipantInput, UserSummary,
};
use crate::database::pagination::{Page, Pagination};
use crate::database::store::{MatchStore, StoreResult};
use crate::database::DatabaseError;

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &MatchFilter) {
    if let Some(club_id) = filter.club_id {
        query.push(" AND club_id = ");
        query.push_bind(club_id);
    }
    match filter.kind {
        Some(MatchKind::Club) => {
            query.push(" AND club_id IS NOT NULL");
        }
        Some(MatchKind::Informal) => {
            query.push(" AND club_id IS NULL");
        }
        None => {}
    }
    if let Some(court_id) = filter.court_id {
        query.push(" AND court_id = ");
        query.push_bind(court_id);
    }
    if let Some(event_id) = filter.event_id {
        query.push(" AND event_id = ");
        query.push_bind(event_id);
    }
    if let Some(match_type) = filter.match_type {
        query.push(" AND match_type = ");
        query.push_bind(match_type);
    }
    if let Some(completed) = filter.completed {
        query.push(" AND completed = ");
        query.push_bind(completed);
    }
    if let Some(user_id) = filter.participant_id {
        query.push(" AND id IN (SELECT match_id FROM match_participants WHERE user_id = ");
        query.push_bind(user_id);
        query.push(")");
    }
    if let Some(user_id) = filter.involving_user_id {
        query.push(" AND (creator_id = ");
        query.push_bind(user_id);
        query.push(" OR id IN (SELECT match_id FROM match_participants WHERE user_id = ");
        query.push_bind(user_id);
        query.push("))");
    }
}

#[derive(FromRow)]
struct RosterRow {
    id: Uuid,
    match_id: Uuid,
    user_id: Uuid,
    team: i16,
    is_winner: bool,
    user_name: String,
    user_email: String,
    user_avatar: Option<String>,
}

impl From<RosterRow> for MatchParticipantView {
    fn from(row: RosterRow) -> Self {
        MatchParticipantView {
            user: UserSummary {
                id: row.user_id,
                name: row.user_name,
                email: row.user_email,
                avatar: row.user_avatar,
            },
            participant: MatchParticipant {
                id: row.id,
                match_id: row.match_id,
                user_id: row.user_id,
                team: row.team,
                is_winner: row.is_winner,
            },
        }
    }
}

#[derive(FromRow)]
struct StatsRow {
    total: i64,
    completed: i64,
    singles: i64,
    doubles: i64,
}

async fn insert_roster(
    conn: &mut PgConnection,
    match_id: Uuid,
    roster: &[ParticipantInput],
) -> Result<(), DatabaseError> {
    for p in roster {
        sqlx::query(
            "INSERT INTO match_participants (id, match_id, user_id, team, is_winner) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(match_id)
        .bind(p.user_id)
        .bind(p.team)
        .bind(p.is_winner)
        .execute(&mut *conn)
        .await
        .map_err(|e| DatabaseError::unique_violation(e, "Duplicate participants are not allowed"))?;
    }
    Ok(())
}

impl PgStore {
    /// Rosters for the given matches, each ordered by (team, userId)
    async fn rosters(&self, match_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, Vec<MatchParticipantView>>> {
        let rows = sqlx::query_as::<_, RosterRow>(
            "SELECT p.id, p.match_id, p.user_id, p.team, p.is_winner, \
                    u.name AS user_name, u.email AS user_email, u.avatar AS user_avatar \
             FROM match_participants p JOIN users u ON u.id = p.user_id \
             WHERE p.match_id = ANY($1) \
             ORDER BY p.team ASC, p.user_id ASC",
        )
        .bind(match_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<MatchParticipantView>> = HashMap::new();
        for row in rows {
            grouped.entry(row.match_id).or_default().push(row.into());
        }
        Ok(grouped)
    }

    async fn detail(&self, record: Match) -> StoreResult<MatchDetail> {
        let mut rosters = self.rosters(&[record.id]).await?;
        Ok(MatchDetail {
            participants: rosters.remove(&record.id).unwrap_or_default(),
            record,
        })
    }
}

#[async_trait]
impl MatchStore for PgStore {
    async fn create_match(&self, new: NewMatch) -> StoreResult<MatchDetail> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO matches (id, match_type, start_time, end_time, score, completed, club_id, \
                court_id, event_id, creator_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
            MATCH_COLUMNS
        );
        let record = sqlx::query_as::<_, Match>(&sql)
            .bind(Uuid::new_v4())
            .bind(new.match_type)
            .bind(new.start_time)
            .bind(new.end_time)
            .bind(&new.score)
            .bind(new.completed)
            .bind(new.club_id)
            .bind(new.court_id)
            .bind(new.event_id)
            .bind(new.creator_id)
            .fetch_one(&mut *tx)
            .await?;

        insert_roster(&mut *tx, record.id, &new.participants).await?;
        tx.commit().await?;

        self.detail(record).await
    }

    async fn find_match(&self, id: Uuid) -> StoreResult<Option<MatchDetail>> {
        let sql = format!("SELECT {} FROM matches WHERE id = $1", MATCH_COLUMNS);
        let record = sqlx::query_as::<_, Match>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match record {
            Some(record) => Ok(Some(self.detail(record).await?)),
            None => Ok(None),
        }
    }

    async fn update_match(&self, id: Uuid, changes: MatchChanges) -> StoreResult<MatchDetail> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE matches SET match_type = $2, start_time = $3, end_time = $4, score = $5, \
                completed = $6, court_id = $7, event_id = $8, updated_at = $9 \
             WHERE id = $1 RETURNING {}",
            MATCH_COLUMNS
        );
        let record = sqlx::query_as::<_, Match>(&sql)
            .bind(id)
            .bind(changes.match_type)
            .bind(changes.start_time)
            .bind(changes.end_time)
            .bind(&changes.score)
            .bind(changes.completed)
            .bind(changes.court_id)
            .bind(changes.event_id)
            .bind(Utc::now())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Match not found".to_string()))?;

        if let Some(roster) = &changes.participants {
            sqlx::query("DELETE FROM match_participants WHERE match_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_roster(&mut *tx, id, roster).await?;
        }

        tx.commit().await?;
        self.detail(record).await
    }

    async fn delete_match(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM matches WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_matches(&self, filter: &MatchFilter, page: Pagination) -> StoreResult<Page<MatchDetail>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM matches WHERE 1=1");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM matches WHERE 1=1", MATCH_COLUMNS));
        push_filters(&mut query, filter);
        query.push(" ORDER BY created_at DESC, id LIMIT ");
        query.push_bind(page.limit());
        query.push(" OFFSET ");
        query.push_bind(page.offset());
        let records = query.build_query_as::<Match>().fetch_all(&self.pool).await?;

        let ids: Vec<Uuid> = records.iter().map(|m| m.id).collect();
        let mut rosters = if ids.is_empty() {
            HashMap::new()
        } else {
            self.rosters(&ids).await?
        };

        let items = records
            .into_iter()
            .map(|record| MatchDetail {
                participants: rosters.remove(&record.id).unwrap_or_default(),
                record,
            })
            .collect();
        Ok(Page::new(items, total, page))
    }

    async fn match_stats(&self, filter: &MatchFilter) -> StoreResult<MatchStats> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) AS total, \
                    COUNT(*) FILTER (WHERE completed) AS completed, \
                    COUNT(*) FILTER (WHERE match_type = 'SINGLES') AS singles, \
                    COUNT(*) FILTER (WHERE match_type = 'DOUBLES') AS doubles \
             FROM matches WHERE 1=1",
        );
        push_filters(&mut query, filter);
        let stats = query.build_query_as::<StatsRow>().fetch_one(&self.pool).await?;

        let wins = match filter.participant_id {
            Some(user_id) => {
                let mut wins = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM matches WHERE 1=1");
                push_filters(&mut wins, filter);
                wins.push(" AND id IN (SELECT match_id FROM match_participants WHERE is_winner AND user_id = ");
                wins.push_bind(user_id);
                wins.push(")");
                wins.build_query_scalar::<i64>().fetch_one(&self.pool).await?
            }
            None => 0,
        };

        Ok(MatchStats {
            total_matches: stats.total,
            completed_matches: stats.completed,
            pending_matches: stats.total - stats.completed,
            singles_matches: stats.singles,
            doubles_matches: stats.doubles,
            wins,
        })
    }
}
