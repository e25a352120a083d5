use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::UserSummary;
use crate::types::MembershipStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub club_id: Uuid,
    pub status: MembershipStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Membership row joined with the member's public profile
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    #[serde(flatten)]
    pub membership: Membership,
    pub user: UserSummary,
}

#[derive(Debug, Clone)]
pub struct NewMembership {
    pub user_id: Uuid,
    pub club_id: Uuid,
    pub status: MembershipStatus,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct MembershipChanges {
    pub status: MembershipStatus,
    pub expires_at: Option<DateTime<Utc>>,
}
