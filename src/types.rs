/// Shared domain enums used across policy, guards, persistence and the API

use serde::{Deserialize, Serialize};

/// Platform-wide role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    SuperAdmin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "membership_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipStatus {
    Active,
    Inactive,
    Pending,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "event_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Tournament,
    League,
    Clinic,
    Social,
    OpenPlay,
}

/// Who may discover and join an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "event_visibility", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventVisibility {
    Open,
    MembersOnly,
    Private,
}

impl Default for EventVisibility {
    fn default() -> Self {
        EventVisibility::MembersOnly
    }
}

/// Event lifecycle state. Transitions live in `guards::event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "event_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "match_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    Singles,
    Doubles,
}

impl MatchType {
    /// Maximum number of participants a match of this type admits
    pub fn max_participants(&self) -> usize {
        match self {
            MatchType::Singles => 2,
            MatchType::Doubles => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_use_screaming_snake_case_on_the_wire() {
        assert_eq!(serde_json::to_string(&Role::SuperAdmin).unwrap(), "\"SUPER_ADMIN\"");
        assert_eq!(
            serde_json::to_string(&EventVisibility::MembersOnly).unwrap(),
            "\"MEMBERS_ONLY\""
        );
        let status: EventStatus = serde_json::from_str("\"ONGOING\"").unwrap();
        assert_eq!(status, EventStatus::Ongoing);
    }

    #[test]
    fn participant_limits_by_match_type() {
        assert_eq!(MatchType::Singles.max_participants(), 2);
        assert_eq!(MatchType::Doubles.max_participants(), 4);
    }
}
