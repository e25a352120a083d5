//! In-process store backed by hash maps behind one `tokio::sync::RwLock`.
//!
//! Mirrors the Postgres schema's uniqueness rules and cascades so services and
//! the HTTP layer can be exercised without a database. Multi-row operations
//! hold the write lock for their whole duration, which gives them the same
//! all-or-nothing behavior as the transactional Postgres paths.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::*;
use super::pagination::{Page, Pagination};
use super::store::*;
use super::DatabaseError;
use crate::guards;
use crate::types::{EventStatus, MatchType, MembershipStatus};

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    clubs: HashMap<Uuid, Club>,
    courts: HashMap<Uuid, Court>,
    memberships: HashMap<Uuid, Membership>,
    events: HashMap<Uuid, Event>,
    event_participants: HashMap<Uuid, EventParticipant>,
    matches: HashMap<Uuid, Match>,
    match_participants: HashMap<Uuid, MatchParticipant>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn not_found(what: &str) -> DatabaseError {
    DatabaseError::NotFound(format!("{} not found", what))
}

fn not_registered() -> DatabaseError {
    DatabaseError::NotFound("User is not registered for this event".to_string())
}

impl MemoryState {
    fn participant(&self, event_id: Uuid, user_id: Uuid) -> Option<&EventParticipant> {
        self.event_participants
            .values()
            .find(|p| p.event_id == event_id && p.user_id == user_id)
    }

    fn summary(&self, user_id: Uuid) -> Option<UserSummary> {
        self.users.get(&user_id).map(UserSummary::from)
    }

    fn match_detail(&self, record: &Match) -> MatchDetail {
        let mut participants: Vec<MatchParticipantView> = self
            .match_participants
            .values()
            .filter(|p| p.match_id == record.id)
            .filter_map(|p| {
                self.summary(p.user_id).map(|user| MatchParticipantView {
                    participant: p.clone(),
                    user,
                })
            })
            .collect();
        participants.sort_by_key(|p| (p.participant.team, p.participant.user_id));
        MatchDetail {
            record: record.clone(),
            participants,
        }
    }

    fn insert_roster(&mut self, match_id: Uuid, roster: &[ParticipantInput]) {
        for p in roster {
            let id = Uuid::new_v4();
            self.match_participants.insert(
                id,
                MatchParticipant {
                    id,
                    match_id,
                    user_id: p.user_id,
                    team: p.team,
                    is_winner: p.is_winner,
                },
            );
        }
    }

    fn remove_events(&mut self, pred: impl Fn(&Event) -> bool) -> i64 {
        let doomed: Vec<Uuid> = self.events.values().filter(|&e| pred(e)).map(|e| e.id).collect();
        for id in &doomed {
            self.events.remove(id);
            self.event_participants.retain(|_, p| p.event_id != *id);
            for m in self.matches.values_mut() {
                if m.event_id == Some(*id) {
                    m.event_id = None;
                }
            }
        }
        doomed.len() as i64
    }

    fn remove_matches(&mut self, pred: impl Fn(&Match) -> bool) -> i64 {
        let doomed: Vec<Uuid> = self.matches.values().filter(|&m| pred(m)).map(|m| m.id).collect();
        for id in &doomed {
            self.matches.remove(id);
            self.match_participants.retain(|_, p| p.match_id != *id);
        }
        doomed.len() as i64
    }

    fn match_matches_filter(&self, m: &Match, filter: &MatchFilter) -> bool {
        let plays = |user_id: Uuid| {
            self.match_participants
                .values()
                .any(|p| p.match_id == m.id && p.user_id == user_id)
        };

        filter.club_id.map_or(true, |id| m.club_id == Some(id))
            && filter.kind.map_or(true, |kind| match kind {
                MatchKind::Club => m.club_id.is_some(),
                MatchKind::Informal => m.club_id.is_none(),
            })
            && filter.court_id.map_or(true, |id| m.court_id == Some(id))
            && filter.event_id.map_or(true, |id| m.event_id == Some(id))
            && filter.match_type.map_or(true, |t| m.match_type == t)
            && filter.completed.map_or(true, |c| m.completed == c)
            && filter.participant_id.map_or(true, &plays)
            && filter
                .involving_user_id
                .map_or(true, |id| m.creator_id == id || plays(id))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == new.email) {
            return Err(DatabaseError::Conflict("Email is already registered".to_string()));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            name: new.name,
            password_hash: new.password_hash,
            phone: new.phone,
            city: new.city,
            avatar: None,
            dupr_id: None,
            dupr_rating: None,
            role: new.role,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<User> {
        let mut state = self.state.write().await;
        if let Some(email) = &changes.email {
            if state.users.values().any(|u| u.id != id && &u.email == email) {
                return Err(DatabaseError::Conflict("Email is already registered".to_string()));
            }
        }
        let user = state.users.get_mut(&id).ok_or_else(|| not_found("User"))?;
        if let Some(v) = changes.email {
            user.email = v;
        }
        if let Some(v) = changes.name {
            user.name = v;
        }
        if let Some(v) = changes.password_hash {
            user.password_hash = v;
        }
        if let Some(v) = changes.phone {
            user.phone = Some(v);
        }
        if let Some(v) = changes.city {
            user.city = Some(v);
        }
        if let Some(v) = changes.avatar {
            user.avatar = Some(v);
        }
        if let Some(v) = changes.dupr_id {
            user.dupr_id = Some(v);
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        if state.clubs.values().any(|c| c.creator_id == id) {
            return Err(DatabaseError::Conflict("User still owns clubs".to_string()));
        }
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }
        state.memberships.retain(|_, m| m.user_id != id);
        state.event_participants.retain(|_, p| p.user_id != id);
        state.match_participants.retain(|_, p| p.user_id != id);
        state.remove_matches(|m| m.creator_id == id);
        Ok(true)
    }

    async fn list_users(&self, filter: &UserFilter, page: Pagination) -> StoreResult<Page<User>> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|u| {
                filter
                    .search
                    .as_deref()
                    .map_or(true, |s| contains_ci(&u.name, s) || contains_ci(&u.email, s))
                    && filter.city.as_deref().map_or(true, |c| {
                        u.city.as_deref().map_or(false, |city| contains_ci(city, c))
                    })
                    && filter.role.map_or(true, |r| u.role == r)
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(Page::new(page.slice(&users), users.len() as i64, page))
    }

    async fn count_clubs_created(&self, user_id: Uuid) -> StoreResult<i64> {
        let state = self.state.read().await;
        Ok(state.clubs.values().filter(|c| c.creator_id == user_id).count() as i64)
    }

    async fn existing_user_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Uuid>> {
        let state = self.state.read().await;
        Ok(ids.iter().copied().filter(|id| state.users.contains_key(id)).collect())
    }
}

#[async_trait]
impl ClubStore for MemoryStore {
    async fn create_club(&self, new: NewClub) -> StoreResult<Club> {
        let mut state = self.state.write().await;
        if state
            .clubs
            .values()
            .any(|c| c.name == new.name && c.city == new.city)
        {
            return Err(DatabaseError::Conflict(
                "A club with this name already exists in this city".to_string(),
            ));
        }
        let now = Utc::now();
        let club = Club {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            address: new.address,
            city: new.city,
            phone: new.phone,
            email: new.email,
            website: new.website,
            logo: new.logo,
            creator_id: new.creator_id,
            created_at: now,
            updated_at: now,
        };
        let membership = Membership {
            id: Uuid::new_v4(),
            user_id: club.creator_id,
            club_id: club.id,
            status: MembershipStatus::Active,
            expires_at: None,
            joined_at: now,
            updated_at: now,
        };
        state.memberships.insert(membership.id, membership);
        state.clubs.insert(club.id, club.clone());
        Ok(club)
    }

    async fn find_club(&self, id: Uuid) -> StoreResult<Option<Club>> {
        Ok(self.state.read().await.clubs.get(&id).cloned())
    }

    async fn find_club_by_name_and_city(&self, name: &str, city: &str) -> StoreResult<Option<Club>> {
        let state = self.state.read().await;
        Ok(state
            .clubs
            .values()
            .find(|c| c.name == name && c.city == city)
            .cloned())
    }

    async fn update_club(&self, id: Uuid, changes: ClubChanges) -> StoreResult<Club> {
        let mut state = self.state.write().await;
        let current = state.clubs.get(&id).cloned().ok_or_else(|| not_found("Club"))?;
        let name = changes.name.clone().unwrap_or(current.name);
        let city = changes.city.clone().unwrap_or(current.city);
        if state
            .clubs
            .values()
            .any(|c| c.id != id && c.name == name && c.city == city)
        {
            return Err(DatabaseError::Conflict(
                "A club with this name already exists in this city".to_string(),
            ));
        }
        let club = state.clubs.get_mut(&id).ok_or_else(|| not_found("Club"))?;
        club.name = name;
        club.city = city;
        if let Some(v) = changes.description {
            club.description = Some(v);
        }
        if let Some(v) = changes.address {
            club.address = v;
        }
        if let Some(v) = changes.phone {
            club.phone = Some(v);
        }
        if let Some(v) = changes.email {
            club.email = Some(v);
        }
        if let Some(v) = changes.website {
            club.website = Some(v);
        }
        if let Some(v) = changes.logo {
            club.logo = Some(v);
        }
        club.updated_at = Utc::now();
        Ok(club.clone())
    }

    async fn delete_club(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        if state.clubs.remove(&id).is_none() {
            return Ok(false);
        }
        let court_ids: Vec<Uuid> = state
            .courts
            .values()
            .filter(|c| c.club_id == id)
            .map(|c| c.id)
            .collect();
        state.remove_matches(|m| {
            m.club_id == Some(id) || m.court_id.map_or(false, |c| court_ids.contains(&c))
        });
        state.remove_events(|e| e.club_id == id);
        state.courts.retain(|_, c| c.club_id != id);
        state.memberships.retain(|_, m| m.club_id != id);
        Ok(true)
    }

    async fn list_clubs(&self, filter: &ClubFilter, page: Pagination) -> StoreResult<Page<Club>> {
        let state = self.state.read().await;
        let mut clubs: Vec<Club> = state
            .clubs
            .values()
            .filter(|c| {
                filter.city.as_deref().map_or(true, |city| contains_ci(&c.city, city))
                    && filter.search.as_deref().map_or(true, |s| {
                        contains_ci(&c.name, s)
                            || c.description.as_deref().map_or(false, |d| contains_ci(d, s))
                    })
            })
            .cloned()
            .collect();
        clubs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(Page::new(page.slice(&clubs), clubs.len() as i64, page))
    }

    async fn count_members(&self, club_id: Uuid) -> StoreResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .values()
            .filter(|m| m.club_id == club_id && m.status == MembershipStatus::Active)
            .count() as i64)
    }
}

#[async_trait]
impl CourtStore for MemoryStore {
    async fn create_court(&self, new: NewCourt) -> StoreResult<Court> {
        let mut state = self.state.write().await;
        if state
            .courts
            .values()
            .any(|c| c.club_id == new.club_id && c.name == new.name)
        {
            return Err(DatabaseError::Conflict(
                "A court with this name already exists in this club".to_string(),
            ));
        }
        let now = Utc::now();
        let court = Court {
            id: Uuid::new_v4(),
            club_id: new.club_id,
            name: new.name,
            description: new.description,
            is_active: new.is_active,
            created_at: now,
            updated_at: now,
        };
        state.courts.insert(court.id, court.clone());
        Ok(court)
    }

    async fn find_court(&self, id: Uuid) -> StoreResult<Option<Court>> {
        Ok(self.state.read().await.courts.get(&id).cloned())
    }

    async fn find_court_by_name(&self, club_id: Uuid, name: &str) -> StoreResult<Option<Court>> {
        let state = self.state.read().await;
        Ok(state
            .courts
            .values()
            .find(|c| c.club_id == club_id && c.name == name)
            .cloned())
    }

    async fn list_courts(
        &self,
        club_id: Uuid,
        is_active: Option<bool>,
        page: Pagination,
    ) -> StoreResult<Page<Court>> {
        let state = self.state.read().await;
        let mut courts: Vec<Court> = state
            .courts
            .values()
            .filter(|c| c.club_id == club_id && is_active.map_or(true, |a| c.is_active == a))
            .cloned()
            .collect();
        courts.sort_by(|a, b| b.is_active.cmp(&a.is_active).then_with(|| a.name.cmp(&b.name)));
        Ok(Page::new(page.slice(&courts), courts.len() as i64, page))
    }

    async fn update_court(&self, id: Uuid, changes: CourtChanges) -> StoreResult<Court> {
        let mut state = self.state.write().await;
        let club_id = state.courts.get(&id).map(|c| c.club_id).ok_or_else(|| not_found("Court"))?;
        if let Some(name) = &changes.name {
            if state
                .courts
                .values()
                .any(|c| c.id != id && c.club_id == club_id && &c.name == name)
            {
                return Err(DatabaseError::Conflict(
                    "A court with this name already exists in this club".to_string(),
                ));
            }
        }
        let court = state.courts.get_mut(&id).ok_or_else(|| not_found("Court"))?;
        if let Some(v) = changes.name {
            court.name = v;
        }
        if let Some(v) = changes.description {
            court.description = Some(v);
        }
        if let Some(v) = changes.is_active {
            court.is_active = v;
        }
        court.updated_at = Utc::now();
        Ok(court.clone())
    }

    async fn delete_court(&self, id: Uuid) -> StoreResult<CourtDeletion> {
        let mut state = self.state.write().await;
        if state.courts.remove(&id).is_none() {
            return Err(not_found("Court"));
        }
        let matches_deleted = state.remove_matches(|m| m.court_id == Some(id));
        let events_deleted = state.remove_events(|e| e.court_id == Some(id));
        Ok(CourtDeletion {
            events_deleted,
            matches_deleted,
        })
    }

    async fn count_future_events(&self, court_id: Uuid, now: DateTime<Utc>) -> StoreResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .events
            .values()
            .filter(|e| {
                e.court_id == Some(court_id)
                    && matches!(e.status, EventStatus::Scheduled | EventStatus::Ongoing)
                    && e.end_date_time >= now
            })
            .count() as i64)
    }

    async fn count_incomplete_matches(&self, court_id: Uuid) -> StoreResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .matches
            .values()
            .filter(|m| m.court_id == Some(court_id) && !m.completed)
            .count() as i64)
    }
}

#[async_trait]
impl MembershipStore for MemoryStore {
    async fn find_membership(&self, user_id: Uuid, club_id: Uuid) -> StoreResult<Option<Membership>> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .values()
            .find(|m| m.user_id == user_id && m.club_id == club_id)
            .cloned())
    }

    async fn create_membership(&self, new: NewMembership) -> StoreResult<Membership> {
        let mut state = self.state.write().await;
        if state
            .memberships
            .values()
            .any(|m| m.user_id == new.user_id && m.club_id == new.club_id)
        {
            return Err(DatabaseError::Conflict(
                "User is already a member of this club".to_string(),
            ));
        }
        let now = Utc::now();
        let membership = Membership {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            club_id: new.club_id,
            status: new.status,
            expires_at: new.expires_at,
            joined_at: now,
            updated_at: now,
        };
        state.memberships.insert(membership.id, membership.clone());
        Ok(membership)
    }

    async fn update_membership(&self, id: Uuid, changes: MembershipChanges) -> StoreResult<Membership> {
        let mut state = self.state.write().await;
        let membership = state.memberships.get_mut(&id).ok_or_else(|| not_found("Membership"))?;
        membership.status = changes.status;
        membership.expires_at = changes.expires_at;
        membership.updated_at = Utc::now();
        Ok(membership.clone())
    }

    async fn delete_membership(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.state.write().await.memberships.remove(&id).is_some())
    }

    async fn list_members(
        &self,
        club_id: Uuid,
        status: Option<MembershipStatus>,
        page: Pagination,
    ) -> StoreResult<Page<MemberView>> {
        let state = self.state.read().await;
        let mut members: Vec<MemberView> = state
            .memberships
            .values()
            .filter(|m| m.club_id == club_id && status.map_or(true, |s| m.status == s))
            .filter_map(|m| {
                state.summary(m.user_id).map(|user| MemberView {
                    membership: m.clone(),
                    user,
                })
            })
            .collect();
        members.sort_by(|a, b| {
            a.membership
                .joined_at
                .cmp(&b.membership.joined_at)
                .then(a.membership.id.cmp(&b.membership.id))
        });
        Ok(Page::new(page.slice(&members), members.len() as i64, page))
    }

    async fn active_member_ids(&self, club_id: Uuid, user_ids: &[Uuid]) -> StoreResult<Vec<Uuid>> {
        let state = self.state.read().await;
        Ok(user_ids
            .iter()
            .copied()
            .filter(|id| {
                state.memberships.values().any(|m| {
                    m.club_id == club_id && m.user_id == *id && m.status == MembershipStatus::Active
                })
            })
            .collect())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn create_event(&self, new: NewEvent) -> StoreResult<Event> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            club_id: new.club_id,
            court_id: new.court_id,
            title: new.title,
            description: new.description,
            event_type: new.event_type,
            visibility: new.visibility,
            status: EventStatus::Scheduled,
            start_date_time: new.start_date_time,
            end_date_time: new.end_date_time,
            max_participants: new.max_participants,
            price: new.price,
            created_at: now,
            updated_at: now,
        };
        state.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn find_event(&self, id: Uuid) -> StoreResult<Option<Event>> {
        Ok(self.state.read().await.events.get(&id).cloned())
    }

    async fn update_event(&self, id: Uuid, changes: EventChanges) -> StoreResult<Event> {
        let mut state = self.state.write().await;
        let event = state.events.get_mut(&id).ok_or_else(|| not_found("Event"))?;
        event.court_id = changes.court_id;
        event.title = changes.title;
        event.description = changes.description;
        event.event_type = changes.event_type;
        event.visibility = changes.visibility;
        event.status = changes.status;
        event.start_date_time = changes.start_date_time;
        event.end_date_time = changes.end_date_time;
        event.max_participants = changes.max_participants;
        event.price = changes.price;
        event.updated_at = Utc::now();
        Ok(event.clone())
    }

    async fn delete_event(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.remove_events(|e| e.id == id) > 0)
    }

    async fn list_events(&self, filter: &EventFilter, page: Pagination) -> StoreResult<Page<Event>> {
        let state = self.state.read().await;
        let mut events: Vec<Event> = state
            .events
            .values()
            .filter(|e| {
                filter.club_id.map_or(true, |id| e.club_id == id)
                    && filter.event_type.map_or(true, |t| e.event_type == t)
                    && filter.status.map_or(true, |s| e.status == s)
                    && filter.visibility.map_or(true, |v| e.visibility == v)
                    && !(filter.exclude_private
                        && e.visibility == crate::types::EventVisibility::Private)
                    && filter.starts_after.map_or(true, |t| e.start_date_time >= t)
                    && filter.starts_before.map_or(true, |t| e.start_date_time <= t)
                    && filter.city.as_deref().map_or(true, |city| {
                        state
                            .clubs
                            .get(&e.club_id)
                            .map_or(false, |c| contains_ci(&c.city, city))
                    })
            })
            .cloned()
            .collect();
        events.sort_by(|a, b| {
            a.start_date_time
                .cmp(&b.start_date_time)
                .then(a.id.cmp(&b.id))
        });
        Ok(Page::new(page.slice(&events), events.len() as i64, page))
    }

    async fn count_participants(&self, event_id: Uuid) -> StoreResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .event_participants
            .values()
            .filter(|p| p.event_id == event_id)
            .count() as i64)
    }

    async fn find_participant(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<Option<EventParticipant>> {
        let state = self.state.read().await;
        Ok(state
            .event_participants
            .values()
            .find(|p| p.event_id == event_id && p.user_id == user_id)
            .cloned())
    }

    async fn join_event(&self, event_id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> StoreResult<EventParticipant> {
        let mut state = self.state.write().await;
        let event = state.events.get(&event_id).ok_or_else(|| not_found("Event"))?;
        let registered = state.participant(event_id, user_id).is_some();
        let count = state
            .event_participants
            .values()
            .filter(|p| p.event_id == event_id)
            .count() as i64;
        guards::event::can_join(event, registered, count, now)?;

        let participant = EventParticipant {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            checked_in: false,
            check_in_time: None,
            joined_at: now,
        };
        state.event_participants.insert(participant.id, participant.clone());
        Ok(participant)
    }

    async fn leave_event(&self, event_id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let event = state.events.get(&event_id).ok_or_else(|| not_found("Event"))?;
        let Some(participant_id) = state.participant(event_id, user_id).map(|p| p.id) else {
            return Ok(false);
        };
        guards::event::can_leave(event, now)?;
        state.event_participants.remove(&participant_id);
        Ok(true)
    }

    async fn check_in(&self, event_id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> StoreResult<CheckInOutcome> {
        let mut state = self.state.write().await;
        let state = &mut *state;
        let event = state.events.get_mut(&event_id).ok_or_else(|| not_found("Event"))?;
        let participant = state
            .event_participants
            .values_mut()
            .find(|p| p.event_id == event_id && p.user_id == user_id)
            .ok_or_else(not_registered)?;
        guards::event::can_check_in(event, participant, now)?;

        participant.checked_in = true;
        participant.check_in_time = Some(now);
        if event.status == EventStatus::Scheduled {
            event.status = EventStatus::Ongoing;
            event.updated_at = now;
        }
        Ok(CheckInOutcome {
            participant: participant.clone(),
            event_status: event.status,
        })
    }

    async fn undo_check_in(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<EventParticipant> {
        let mut state = self.state.write().await;
        let state = &mut *state;
        let event = state.events.get(&event_id).ok_or_else(|| not_found("Event"))?;
        let participant = state
            .event_participants
            .values_mut()
            .find(|p| p.event_id == event_id && p.user_id == user_id)
            .ok_or_else(not_registered)?;
        guards::event::can_undo_check_in(event, participant)?;

        participant.checked_in = false;
        participant.check_in_time = None;
        Ok(participant.clone())
    }

    async fn list_participants(
        &self,
        event_id: Uuid,
        checked_in: Option<bool>,
    ) -> StoreResult<Vec<ParticipantView>> {
        let state = self.state.read().await;
        let mut participants: Vec<ParticipantView> = state
            .event_participants
            .values()
            .filter(|p| p.event_id == event_id && checked_in.map_or(true, |c| p.checked_in == c))
            .filter_map(|p| {
                state.summary(p.user_id).map(|user| ParticipantView {
                    participant: p.clone(),
                    user,
                })
            })
            .collect();
        participants.sort_by(|a, b| {
            a.participant
                .joined_at
                .cmp(&b.participant.joined_at)
                .then(a.participant.id.cmp(&b.participant.id))
        });
        Ok(participants)
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn create_match(&self, new: NewMatch) -> StoreResult<MatchDetail> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let record = Match {
            id: Uuid::new_v4(),
            match_type: new.match_type,
            start_time: new.start_time,
            end_time: new.end_time,
            score: new.score,
            completed: new.completed,
            club_id: new.club_id,
            court_id: new.court_id,
            event_id: new.event_id,
            creator_id: new.creator_id,
            created_at: now,
            updated_at: now,
        };
        state.matches.insert(record.id, record.clone());
        state.insert_roster(record.id, &new.participants);
        Ok(state.match_detail(&record))
    }

    async fn find_match(&self, id: Uuid) -> StoreResult<Option<MatchDetail>> {
        let state = self.state.read().await;
        Ok(state.matches.get(&id).map(|m| state.match_detail(m)))
    }

    async fn update_match(&self, id: Uuid, changes: MatchChanges) -> StoreResult<MatchDetail> {
        let mut state = self.state.write().await;
        let record = state.matches.get_mut(&id).ok_or_else(|| not_found("Match"))?;
        record.match_type = changes.match_type;
        record.start_time = changes.start_time;
        record.end_time = changes.end_time;
        record.score = changes.score;
        record.completed = changes.completed;
        record.court_id = changes.court_id;
        record.event_id = changes.event_id;
        record.updated_at = Utc::now();
        let record = record.clone();

        if let Some(roster) = changes.participants {
            state.match_participants.retain(|_, p| p.match_id != id);
            state.insert_roster(id, &roster);
        }
        Ok(state.match_detail(&record))
    }

    async fn delete_match(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.remove_matches(|m| m.id == id) > 0)
    }

    async fn list_matches(&self, filter: &MatchFilter, page: Pagination) -> StoreResult<Page<MatchDetail>> {
        let state = self.state.read().await;
        let mut matches: Vec<&Match> = state
            .matches
            .values()
            .filter(|m| state.match_matches_filter(m, filter))
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        let total = matches.len() as i64;
        let items = page
            .slice(&matches)
            .into_iter()
            .map(|m| state.match_detail(m))
            .collect();
        Ok(Page::new(items, total, page))
    }

    async fn match_stats(&self, filter: &MatchFilter) -> StoreResult<MatchStats> {
        let state = self.state.read().await;
        let matches: Vec<&Match> = state
            .matches
            .values()
            .filter(|m| state.match_matches_filter(m, filter))
            .collect();
        let completed = matches.iter().filter(|m| m.completed).count() as i64;
        let wins = filter.participant_id.map_or(0, |user_id| {
            matches
                .iter()
                .filter(|m| {
                    state
                        .match_participants
                        .values()
                        .any(|p| p.match_id == m.id && p.user_id == user_id && p.is_winner)
                })
                .count() as i64
        });
        Ok(MatchStats {
            total_matches: matches.len() as i64,
            completed_matches: completed,
            pending_matches: matches.len() as i64 - completed,
            singles_matches: matches.iter().filter(|m| m.match_type == MatchType::Singles).count() as i64,
            doubles_matches: matches.iter().filter(|m| m.match_type == MatchType::Doubles).count() as i64,
            wins,
        })
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
