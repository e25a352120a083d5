use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use futures::future::try_join_all;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::{required_text, ServiceContext, ServiceResult};
use crate::database::models::{
    CheckInOutcome, Club, Court, Event, EventChanges, EventFilter, EventParticipant, MatchDetail,
    MatchFilter, MatchStats, NewEvent, ParticipantView,
};
use crate::database::{EventStore, MatchStore, Page, PageParams, Pagination};
use crate::error::ApiError;
use crate::guards;
use crate::policy::{authorize, require_actor, Actor, ClubAction, EventAction, EventFacts};
use crate::types::{EventStatus, EventType, EventVisibility};

const NEARBY_MAX_DAYS: i64 = 30;
const NEARBY_MAX_LIMIT: u32 = 50;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListQuery {
    pub club_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub event_type: Option<EventType>,
    pub status: Option<EventStatus>,
    pub city: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub upcoming: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyQuery {
    pub city: Option<String>,
    pub days_ahead: Option<i64>,
    pub limit: Option<u32>,
    pub open_only: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub club_id: Uuid,
    pub court_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub visibility: Option<EventVisibility>,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    pub max_participants: Option<i32>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub court_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<EventType>,
    pub visibility: Option<EventVisibility>,
    pub status: Option<EventStatus>,
    pub start_date_time: Option<DateTime<Utc>>,
    pub end_date_time: Option<DateTime<Utc>>,
    pub max_participants: Option<i32>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantsQuery {
    pub checked_in: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub participant_count: i64,
    pub available_spots: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubRef {
    pub id: Uuid,
    pub name: String,
    pub city: String,
}

impl From<&Club> for ClubRef {
    fn from(club: &Club) -> Self {
        Self {
            id: club.id,
            name: club.name.clone(),
            city: club.city.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    #[serde(flatten)]
    pub view: EventView,
    pub club: ClubRef,
    pub court: Option<Court>,
    /// Absent for anonymous callers
    pub is_registered: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyEvents {
    pub city: String,
    pub days_ahead: i64,
    pub window_end: DateTime<Utc>,
    pub events: Vec<EventView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventParticipants {
    pub event_id: Uuid,
    pub total: usize,
    pub checked_in_count: usize,
    pub participants: Vec<ParticipantView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMatches {
    pub matches: Page<MatchDetail>,
    pub stats: MatchStats,
}

/// 23:59:59 UTC on the day `days_ahead` days after `now`
fn nearby_window_end(now: DateTime<Utc>, days_ahead: i64) -> ServiceResult<DateTime<Utc>> {
    let last_day = (now + Duration::days(days_ahead)).date_naive();
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59)
        .ok_or_else(|| ApiError::internal_server_error("Invalid time window"))?;
    Ok(Utc.from_utc_datetime(&last_day.and_time(end_of_day)))
}

fn validate_capacity(max_participants: Option<i32>) -> ServiceResult<()> {
    match max_participants {
        Some(n) if n <= 0 => Err(ApiError::invalid_field(
            "maxParticipants",
            "Max participants must be a positive number",
        )),
        _ => Ok(()),
    }
}

fn validate_price(price: Option<Decimal>) -> ServiceResult<()> {
    match price {
        Some(p) if p < Decimal::ZERO => {
            Err(ApiError::invalid_field("price", "Price cannot be negative"))
        }
        _ => Ok(()),
    }
}

pub struct EventService<'a> {
    ctx: ServiceContext<'a>,
}

impl<'a> EventService<'a> {
    pub fn new(ctx: ServiceContext<'a>) -> Self {
        Self { ctx }
    }

    /// Public listing; PRIVATE events never appear
    pub async fn list(&self, query: EventListQuery) -> ServiceResult<Page<EventView>> {
        let mut starts_after = query.start_date;
        if query.upcoming == Some(true) {
            let now = Utc::now();
            starts_after = Some(starts_after.map_or(now, |after| after.max(now)));
        }

        let filter = EventFilter {
            club_id: query.club_id,
            event_type: query.event_type,
            status: query.status,
            city: query.city,
            starts_after,
            starts_before: query.end_date,
            visibility: None,
            exclude_private: true,
        };
        let page = self.ctx.page(PageParams { page: query.page, limit: query.limit });
        let events = self.ctx.store.list_events(&filter, page).await?;
        self.views(events).await
    }

    /// Upcoming SCHEDULED events in a city within the next `daysAhead` days
    pub async fn nearby(&self, query: NearbyQuery) -> ServiceResult<NearbyEvents> {
        let city = match query.city.as_deref().map(str::trim) {
            Some(city) if !city.is_empty() => city.to_string(),
            _ => return Err(ApiError::invalid_field("city", "City is required")),
        };
        let days_ahead = query.days_ahead.unwrap_or(7);
        if !(1..=NEARBY_MAX_DAYS).contains(&days_ahead) {
            return Err(ApiError::invalid_field(
                "daysAhead",
                format!("daysAhead must be between 1 and {}", NEARBY_MAX_DAYS),
            ));
        }
        let limit = query.limit.unwrap_or(20).clamp(1, NEARBY_MAX_LIMIT);

        let now = Utc::now();
        let window_end = nearby_window_end(now, days_ahead)?;
        let filter = EventFilter {
            city: Some(city.clone()),
            status: Some(EventStatus::Scheduled),
            starts_after: Some(now),
            starts_before: Some(window_end),
            visibility: query.open_only.unwrap_or(false).then_some(EventVisibility::Open),
            exclude_private: true,
            ..Default::default()
        };
        let events = self
            .ctx
            .store
            .list_events(&filter, Pagination::new(1, limit))
            .await?;

        Ok(NearbyEvents {
            city,
            days_ahead,
            window_end,
            events: self.views(events).await?.items,
        })
    }

    /// PRIVATE events require an identity that passes the view policy
    pub async fn get(&self, actor: Option<&Actor>, id: Uuid) -> ServiceResult<EventDetail> {
        let event = self.ctx.load_event(id).await?;
        let club = self.ctx.load_club(event.club_id).await?;
        self.ensure_visible(actor, &event, &club).await?;

        let court = match event.court_id {
            Some(court_id) => self.ctx.store.find_court(court_id).await?,
            None => None,
        };
        let is_registered = match actor {
            Some(actor) => Some(
                self.ctx
                    .store
                    .find_participant(event.id, actor.user_id)
                    .await?
                    .is_some(),
            ),
            None => None,
        };

        Ok(EventDetail {
            club: ClubRef::from(&club),
            view: self.view(event).await?,
            court,
            is_registered,
        })
    }

    pub async fn create(&self, actor: &Actor, request: CreateEventRequest) -> ServiceResult<Event> {
        let club = self.ctx.load_club(request.club_id).await?;
        let facts = self.ctx.club_facts(&club, actor).await?;
        authorize(actor, &facts, ClubAction::ManageEvents)?;

        let title = required_text("title", &request.title, 100)?;
        guards::event::validate_future_start(request.start_date_time, Utc::now())?;
        guards::event::validate_schedule(request.start_date_time, request.end_date_time)?;
        validate_capacity(request.max_participants)?;
        validate_price(request.price)?;
        if let Some(court_id) = request.court_id {
            let court = self.ctx.load_court(court_id).await?;
            guards::matches::validate_court(&court, Some(club.id))?;
        }

        let event = self
            .ctx
            .store
            .create_event(NewEvent {
                club_id: club.id,
                court_id: request.court_id,
                title,
                description: request.description,
                event_type: request.event_type,
                visibility: request.visibility.unwrap_or_default(),
                start_date_time: request.start_date_time,
                end_date_time: request.end_date_time,
                max_participants: request.max_participants,
                price: request.price,
            })
            .await?;

        tracing::info!("Event {} created in club {}", event.id, club.id);
        Ok(event)
    }

    /// Merges the request onto the stored event and validates the result
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        request: UpdateEventRequest,
    ) -> ServiceResult<Event> {
        let (event, _club) = self.authorized(actor, id, EventAction::Manage).await?;
        let mut changes = EventChanges::from(&event);

        if let Some(title) = &request.title {
            changes.title = required_text("title", title, 100)?;
        }
        if request.description.is_some() {
            changes.description = request.description;
        }
        if let Some(event_type) = request.event_type {
            changes.event_type = event_type;
        }
        if let Some(visibility) = request.visibility {
            changes.visibility = visibility;
        }
        if let Some(status) = request.status {
            changes.status = guards::event::transition(event.status, status)?;
            if changes.status != event.status {
                tracing::debug!(
                    "Event {} moves from {:?} to {:?}",
                    event.id,
                    event.status,
                    changes.status
                );
            }
        }
        if let Some(start) = request.start_date_time {
            changes.start_date_time = start;
        }
        if let Some(end) = request.end_date_time {
            changes.end_date_time = end;
        }
        guards::event::validate_schedule(changes.start_date_time, changes.end_date_time)?;
        if request.start_date_time.is_some() && changes.status == EventStatus::Scheduled {
            guards::event::validate_future_start(changes.start_date_time, Utc::now())?;
        }

        if let Some(court_id) = request.court_id {
            if event.court_id != Some(court_id) {
                let court = self.ctx.load_court(court_id).await?;
                guards::matches::validate_court(&court, Some(event.club_id))?;
                changes.court_id = Some(court_id);
            }
        }

        if let Some(max) = request.max_participants {
            validate_capacity(Some(max))?;
            let current = self.ctx.store.count_participants(event.id).await?;
            if (max as i64) < current {
                return Err(ApiError::conflict_with(
                    "Max participants cannot be lower than the current participant count",
                    json!({ "currentParticipants": current }),
                ));
            }
            changes.max_participants = Some(max);
        }
        if request.price.is_some() {
            validate_price(request.price)?;
            changes.price = request.price;
        }

        Ok(self.ctx.store.update_event(event.id, changes).await?)
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> ServiceResult<()> {
        let (event, _club) = self.authorized(actor, id, EventAction::Manage).await?;
        guards::event::can_delete(&event)?;
        self.ctx.store.delete_event(event.id).await?;
        tracing::info!("Event {} deleted by {}", event.id, actor.user_id);
        Ok(())
    }

    /// Registration rules are re-checked by the store against the locked event row
    pub async fn join(&self, actor: &Actor, id: Uuid) -> ServiceResult<EventParticipant> {
        let (event, _club) = self.authorized(actor, id, EventAction::Join).await?;
        let participant = self
            .ctx
            .store
            .join_event(event.id, actor.user_id, Utc::now())
            .await?;
        tracing::debug!("User {} joined event {}", actor.user_id, event.id);
        Ok(participant)
    }

    pub async fn leave(&self, actor: &Actor, id: Uuid) -> ServiceResult<()> {
        let event = self.ctx.load_event(id).await?;
        if !self
            .ctx
            .store
            .leave_event(event.id, actor.user_id, Utc::now())
            .await?
        {
            return Err(ApiError::not_found("You are not registered for this event"));
        }
        tracing::debug!("User {} left event {}", actor.user_id, event.id);
        Ok(())
    }

    /// Checks in the caller, or `request.user_id` when the caller may check in others.
    /// The first check-in of a SCHEDULED event moves it to ONGOING.
    pub async fn check_in(
        &self,
        actor: &Actor,
        id: Uuid,
        request: CheckInRequest,
    ) -> ServiceResult<CheckInOutcome> {
        let (event, target) = self.check_in_target(actor, id, request.user_id).await?;
        let outcome = self.ctx.store.check_in(event.id, target, Utc::now()).await?;
        if outcome.event_status != event.status {
            tracing::debug!(
                "Event {} moves to {:?} on first check-in",
                event.id,
                outcome.event_status
            );
        }
        Ok(outcome)
    }

    pub async fn undo_check_in(
        &self,
        actor: &Actor,
        id: Uuid,
        user_id: Option<Uuid>,
    ) -> ServiceResult<EventParticipant> {
        let (event, target) = self.check_in_target(actor, id, user_id).await?;
        Ok(self.ctx.store.undo_check_in(event.id, target).await?)
    }

    pub async fn participants(
        &self,
        actor: &Actor,
        id: Uuid,
        query: ParticipantsQuery,
    ) -> ServiceResult<EventParticipants> {
        let (event, _club) = self
            .authorized(actor, id, EventAction::ViewParticipants)
            .await?;

        let all = self.ctx.store.list_participants(event.id, None).await?;
        let total = all.len();
        let checked_in_count = all.iter().filter(|p| p.participant.checked_in).count();
        let participants = match query.checked_in {
            Some(flag) => all
                .into_iter()
                .filter(|p| p.participant.checked_in == flag)
                .collect(),
            None => all,
        };

        Ok(EventParticipants {
            event_id: event.id,
            total,
            checked_in_count,
            participants,
        })
    }

    pub async fn matches(
        &self,
        actor: Option<&Actor>,
        id: Uuid,
        params: PageParams,
    ) -> ServiceResult<EventMatches> {
        let event = self.ctx.load_event(id).await?;
        let club = self.ctx.load_club(event.club_id).await?;
        self.ensure_visible(actor, &event, &club).await?;

        let filter = MatchFilter {
            event_id: Some(event.id),
            ..Default::default()
        };
        let matches = self
            .ctx
            .store
            .list_matches(&filter, self.ctx.page(params))
            .await?;
        let stats = self.ctx.store.match_stats(&filter).await?;
        Ok(EventMatches { matches, stats })
    }

    async fn ensure_visible(&self, actor: Option<&Actor>, event: &Event, club: &Club) -> ServiceResult<()> {
        if event.visibility != EventVisibility::Private {
            return Ok(());
        }
        let actor = require_actor(actor)?;
        let facts = EventFacts {
            visibility: event.visibility,
            club: self.ctx.club_facts(club, actor).await?,
        };
        authorize(actor, &facts, EventAction::View)?;
        Ok(())
    }

    async fn authorized(
        &self,
        actor: &Actor,
        id: Uuid,
        action: EventAction,
    ) -> ServiceResult<(Event, Club)> {
        let event = self.ctx.load_event(id).await?;
        let club = self.ctx.load_club(event.club_id).await?;
        let facts = EventFacts {
            visibility: event.visibility,
            club: self.ctx.club_facts(&club, actor).await?,
        };
        authorize(actor, &facts, action)?;
        Ok((event, club))
    }

    async fn check_in_target(
        &self,
        actor: &Actor,
        id: Uuid,
        user_id: Option<Uuid>,
    ) -> ServiceResult<(Event, Uuid)> {
        let target = user_id.unwrap_or(actor.user_id);
        if target == actor.user_id {
            return Ok((self.ctx.load_event(id).await?, target));
        }
        let (event, _club) = self.authorized(actor, id, EventAction::CheckInOther).await?;
        Ok((event, target))
    }

    async fn view(&self, event: Event) -> ServiceResult<EventView> {
        let participant_count = self.ctx.store.count_participants(event.id).await?;
        let available_spots = event
            .max_participants
            .map(|max| (max as i64 - participant_count).max(0));
        Ok(EventView {
            event,
            participant_count,
            available_spots,
        })
    }

    async fn views(&self, page: Page<Event>) -> ServiceResult<Page<EventView>> {
        let items = try_join_all(page.items.into_iter().map(|event| self.view(event))).await?;
        Ok(Page {
            items,
            pagination: page.pagination,
        })
    }
}
