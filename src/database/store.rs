//! Persistence gateway traits.
//!
//! One async trait per aggregate, all object safe so application state can
//! hold an `Arc<dyn Store>`. Implementations: [`crate::database::PgStore`] for
//! Postgres and [`crate::database::MemoryStore`] for tests and local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::models::*;
use super::pagination::{Page, Pagination};
use super::DatabaseError;
use crate::types::MembershipStatus;

pub type StoreResult<T> = Result<T, DatabaseError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the email is taken
    async fn create_user(&self, new: NewUser) -> StoreResult<User>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<User>;
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;
    async fn list_users(&self, filter: &UserFilter, page: Pagination) -> StoreResult<Page<User>>;
    async fn count_clubs_created(&self, user_id: Uuid) -> StoreResult<i64>;
    /// Subset of `ids` that resolve to existing users
    async fn existing_user_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Uuid>>;
}

#[async_trait]
pub trait ClubStore: Send + Sync {
    /// Inserts the club and the creator's ACTIVE membership atomically
    async fn create_club(&self, new: NewClub) -> StoreResult<Club>;
    async fn find_club(&self, id: Uuid) -> StoreResult<Option<Club>>;
    async fn find_club_by_name_and_city(&self, name: &str, city: &str) -> StoreResult<Option<Club>>;
    async fn update_club(&self, id: Uuid, changes: ClubChanges) -> StoreResult<Club>;
    /// Cascades to courts, memberships, events and matches
    async fn delete_club(&self, id: Uuid) -> StoreResult<bool>;
    async fn list_clubs(&self, filter: &ClubFilter, page: Pagination) -> StoreResult<Page<Club>>;
    async fn count_members(&self, club_id: Uuid) -> StoreResult<i64>;
}

#[async_trait]
pub trait CourtStore: Send + Sync {
    async fn create_court(&self, new: NewCourt) -> StoreResult<Court>;
    async fn find_court(&self, id: Uuid) -> StoreResult<Option<Court>>;
    async fn find_court_by_name(&self, club_id: Uuid, name: &str) -> StoreResult<Option<Court>>;
    /// Active courts first, then by name
    async fn list_courts(
        &self,
        club_id: Uuid,
        is_active: Option<bool>,
        page: Pagination,
    ) -> StoreResult<Page<Court>>;
    async fn update_court(&self, id: Uuid, changes: CourtChanges) -> StoreResult<Court>;
    async fn delete_court(&self, id: Uuid) -> StoreResult<CourtDeletion>;
    /// SCHEDULED or ONGOING events on the court that have not ended by `now`
    async fn count_future_events(&self, court_id: Uuid, now: DateTime<Utc>) -> StoreResult<i64>;
    async fn count_incomplete_matches(&self, court_id: Uuid) -> StoreResult<i64>;
}

#[async_trait]
pub trait MembershipStore: Send + Sync {
    async fn find_membership(&self, user_id: Uuid, club_id: Uuid) -> StoreResult<Option<Membership>>;
    /// Fails with `Conflict` when the (user, club) pair already exists
    async fn create_membership(&self, new: NewMembership) -> StoreResult<Membership>;
    async fn update_membership(&self, id: Uuid, changes: MembershipChanges) -> StoreResult<Membership>;
    async fn delete_membership(&self, id: Uuid) -> StoreResult<bool>;
    async fn list_members(
        &self,
        club_id: Uuid,
        status: Option<MembershipStatus>,
        page: Pagination,
    ) -> StoreResult<Page<MemberView>>;
    /// Subset of `user_ids` holding an ACTIVE membership in the club
    async fn active_member_ids(&self, club_id: Uuid, user_ids: &[Uuid]) -> StoreResult<Vec<Uuid>>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn create_event(&self, new: NewEvent) -> StoreResult<Event>;
    async fn find_event(&self, id: Uuid) -> StoreResult<Option<Event>>;
    async fn update_event(&self, id: Uuid, changes: EventChanges) -> StoreResult<Event>;
    async fn delete_event(&self, id: Uuid) -> StoreResult<bool>;
    /// Ordered by start ascending
    async fn list_events(&self, filter: &EventFilter, page: Pagination) -> StoreResult<Page<Event>>;
    async fn count_participants(&self, event_id: Uuid) -> StoreResult<i64>;
    async fn find_participant(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<Option<EventParticipant>>;
    // The registration operations below lock the event row, re-read it and
    // run the lifecycle guard against that row; failures surface as
    // `DatabaseError::Rejected`.

    async fn join_event(&self, event_id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> StoreResult<EventParticipant>;
    /// `false` when the user was not registered
    async fn leave_event(&self, event_id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> StoreResult<bool>;
    /// Marks the participant checked in; the first check-in moves a SCHEDULED event to ONGOING
    async fn check_in(&self, event_id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> StoreResult<CheckInOutcome>;
    async fn undo_check_in(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<EventParticipant>;
    /// Ordered by join time
    async fn list_participants(
        &self,
        event_id: Uuid,
        checked_in: Option<bool>,
    ) -> StoreResult<Vec<ParticipantView>>;
}

#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Inserts the match and its roster atomically
    async fn create_match(&self, new: NewMatch) -> StoreResult<MatchDetail>;
    async fn find_match(&self, id: Uuid) -> StoreResult<Option<MatchDetail>>;
    /// Updates columns and, when given, replaces the roster atomically
    async fn update_match(&self, id: Uuid, changes: MatchChanges) -> StoreResult<MatchDetail>;
    async fn delete_match(&self, id: Uuid) -> StoreResult<bool>;
    /// Newest first
    async fn list_matches(&self, filter: &MatchFilter, page: Pagination) -> StoreResult<Page<MatchDetail>>;
    async fn match_stats(&self, filter: &MatchFilter) -> StoreResult<MatchStats>;
}

/// Everything the services need from persistence
#[async_trait]
pub trait Store:
    UserStore + ClubStore + CourtStore + MembershipStore + EventStore + MatchStore
{
    /// Cheap connectivity probe for `/health`
    async fn ping(&self) -> StoreResult<()>;
}
