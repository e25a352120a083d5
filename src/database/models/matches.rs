use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::UserSummary;
use crate::types::MatchType;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: Uuid,
    pub match_type: MatchType,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub score: Option<String>,
    pub completed: bool,
    pub club_id: Option<Uuid>,
    pub court_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MatchParticipant {
    pub id: Uuid,
    pub match_id: Uuid,
    pub user_id: Uuid,
    pub team: i16,
    pub is_winner: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchParticipantView {
    #[serde(flatten)]
    pub participant: MatchParticipant,
    pub user: UserSummary,
}

/// A match with its roster ordered by (team, userId)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetail {
    #[serde(flatten)]
    pub record: Match,
    pub participants: Vec<MatchParticipantView>,
}

impl MatchDetail {
    pub fn participant_ids(&self) -> Vec<Uuid> {
        self.participants.iter().map(|p| p.participant.user_id).collect()
    }
}

/// Roster entry as submitted by a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInput {
    pub user_id: Uuid,
    pub team: i16,
    #[serde(default)]
    pub is_winner: bool,
}

#[derive(Debug, Clone)]
pub struct NewMatch {
    pub match_type: MatchType,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub score: Option<String>,
    pub completed: bool,
    pub club_id: Option<Uuid>,
    pub court_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    pub creator_id: Uuid,
    pub participants: Vec<ParticipantInput>,
}

/// Full replacement of the mutable match columns; `participants` replaces the roster when set
#[derive(Debug, Clone)]
pub struct MatchChanges {
    pub match_type: MatchType,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub score: Option<String>,
    pub completed: bool,
    pub court_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    pub participants: Option<Vec<ParticipantInput>>,
}

/// Which side of the club/informal split a listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Club,
    Informal,
}

#[derive(Debug, Clone, Default)]
pub struct MatchFilter {
    pub club_id: Option<Uuid>,
    pub kind: Option<MatchKind>,
    pub court_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    pub match_type: Option<MatchType>,
    pub completed: Option<bool>,
    /// Matches the user plays in
    pub participant_id: Option<Uuid>,
    /// Matches the user created or plays in
    pub involving_user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MatchStats {
    pub total_matches: i64,
    pub completed_matches: i64,
    pub pending_matches: i64,
    pub singles_matches: i64,
    pub doubles_matches: i64,
    /// Wins of `MatchFilter::participant_id`, zero when unset
    pub wins: i64,
}
