use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::UserSummary;
use crate::types::{EventStatus, EventType, EventVisibility};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub club_id: Uuid,
    pub court_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub visibility: EventVisibility,
    pub status: EventStatus,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    pub max_participants: Option<i32>,
    pub price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_priced(&self) -> bool {
        self.price.map(|p| p > Decimal::ZERO).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventParticipant {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub checked_in: bool,
    pub check_in_time: Option<DateTime<Utc>>,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantView {
    #[serde(flatten)]
    pub participant: EventParticipant,
    pub user: UserSummary,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub club_id: Uuid,
    pub court_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub event_type: EventType,
    pub visibility: EventVisibility,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    pub max_participants: Option<i32>,
    pub price: Option<Decimal>,
}

/// Full replacement of the mutable columns, computed by merging a request onto the stored row
#[derive(Debug, Clone)]
pub struct EventChanges {
    pub court_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub event_type: EventType,
    pub visibility: EventVisibility,
    pub status: EventStatus,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    pub max_participants: Option<i32>,
    pub price: Option<Decimal>,
}

impl From<&Event> for EventChanges {
    fn from(event: &Event) -> Self {
        Self {
            court_id: event.court_id,
            title: event.title.clone(),
            description: event.description.clone(),
            event_type: event.event_type,
            visibility: event.visibility,
            status: event.status,
            start_date_time: event.start_date_time,
            end_date_time: event.end_date_time,
            max_participants: event.max_participants,
            price: event.price,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub club_id: Option<Uuid>,
    pub event_type: Option<EventType>,
    pub status: Option<EventStatus>,
    pub city: Option<String>,
    pub starts_after: Option<DateTime<Utc>>,
    pub starts_before: Option<DateTime<Utc>>,
    pub visibility: Option<EventVisibility>,
    /// PRIVATE events are never part of listings
    pub exclude_private: bool,
}

/// Participant row after a check-in, plus the event status it left behind
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInOutcome {
    pub participant: EventParticipant,
    pub event_status: EventStatus,
}
