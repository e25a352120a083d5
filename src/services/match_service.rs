use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::{ServiceContext, ServiceResult};
use crate::database::models::{
    Club, MatchChanges, MatchDetail, MatchFilter, NewMatch, ParticipantInput,
};
use crate::database::{MatchStore, MembershipStore, Page, PageParams, UserStore};
use crate::error::ApiError;
use crate::guards;
use crate::policy::{authorize, Actor, ClubAction, MatchAction, MatchFacts};
use crate::types::MatchType;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    pub match_type: MatchType,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub score: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub court_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    pub participants: Vec<ParticipantInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMatchRequest {
    pub match_type: Option<MatchType>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub score: Option<String>,
    pub completed: Option<bool>,
    pub court_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    pub participants: Option<Vec<ParticipantInput>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchListQuery {
    pub match_type: Option<MatchType>,
    pub completed: Option<bool>,
    pub user_id: Option<Uuid>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubMatchListQuery {
    pub match_type: Option<MatchType>,
    pub completed: Option<bool>,
    pub court_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

fn roster_inputs(detail: &MatchDetail) -> Vec<ParticipantInput> {
    detail
        .participants
        .iter()
        .map(|p| ParticipantInput {
            user_id: p.participant.user_id,
            team: p.participant.team,
            is_winner: p.participant.is_winner,
        })
        .collect()
}

/// Club and informal matches share one table; `club_id` tells them apart.
pub struct MatchService<'a> {
    ctx: ServiceContext<'a>,
}

impl<'a> MatchService<'a> {
    pub fn new(ctx: ServiceContext<'a>) -> Self {
        Self { ctx }
    }

    // Informal matches

    pub async fn create_informal(
        &self,
        actor: &Actor,
        request: CreateMatchRequest,
    ) -> ServiceResult<MatchDetail> {
        self.validate_shape(&request)?;
        self.ensure_users_exist(&request.participants).await?;

        if let Some(court_id) = request.court_id {
            let court = self.ctx.load_court(court_id).await?;
            guards::matches::validate_court(&court, None)?;
        }
        if let Some(event_id) = request.event_id {
            self.ctx.load_event(event_id).await?;
        }

        let detail = self.insert(actor, None, request).await?;
        tracing::info!("Informal match {} recorded by {}", detail.record.id, actor.user_id);
        Ok(detail)
    }

    /// Matches the caller created or plays in
    pub async fn list_for_actor(
        &self,
        actor: &Actor,
        query: MatchListQuery,
    ) -> ServiceResult<Page<MatchDetail>> {
        let filter = MatchFilter {
            match_type: query.match_type,
            completed: query.completed,
            participant_id: query.user_id,
            involving_user_id: Some(actor.user_id),
            ..Default::default()
        };
        let page = self.ctx.page(PageParams { page: query.page, limit: query.limit });
        Ok(self.ctx.store.list_matches(&filter, page).await?)
    }

    pub async fn get(&self, actor: &Actor, id: Uuid) -> ServiceResult<MatchDetail> {
        let detail = self.load(id).await?;
        self.authorize(actor, &detail, MatchAction::View).await?;
        Ok(detail)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        request: UpdateMatchRequest,
    ) -> ServiceResult<MatchDetail> {
        let detail = self.load(id).await?;
        self.apply_update(actor, detail, request).await
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> ServiceResult<()> {
        let detail = self.load(id).await?;
        self.remove(actor, detail).await
    }

    // Club matches

    pub async fn create_for_club(
        &self,
        actor: &Actor,
        club_id: Uuid,
        request: CreateMatchRequest,
    ) -> ServiceResult<MatchDetail> {
        let club = self.club_for(actor, club_id, ClubAction::ManageMatches).await?;
        self.validate_shape(&request)?;

        let court_id = request.court_id.ok_or_else(|| {
            ApiError::invalid_field("courtId", "Court is required for club matches")
        })?;
        let court = self.ctx.load_court(court_id).await?;
        guards::matches::validate_court(&court, Some(club.id))?;
        if let Some(event_id) = request.event_id {
            self.ensure_event_in_club(event_id, club.id).await?;
        }

        self.ensure_users_exist(&request.participants).await?;
        self.ensure_active_members(club.id, &request.participants).await?;

        let detail = self.insert(actor, Some(club.id), request).await?;
        tracing::info!("Club match {} recorded in club {}", detail.record.id, club.id);
        Ok(detail)
    }

    pub async fn list_for_club(
        &self,
        actor: &Actor,
        club_id: Uuid,
        query: ClubMatchListQuery,
    ) -> ServiceResult<Page<MatchDetail>> {
        let club = self.club_for(actor, club_id, ClubAction::ViewMatches).await?;
        let filter = MatchFilter {
            club_id: Some(club.id),
            court_id: query.court_id,
            event_id: query.event_id,
            match_type: query.match_type,
            completed: query.completed,
            ..Default::default()
        };
        let page = self.ctx.page(PageParams { page: query.page, limit: query.limit });
        Ok(self.ctx.store.list_matches(&filter, page).await?)
    }

    pub async fn get_in_club(&self, actor: &Actor, club_id: Uuid, id: Uuid) -> ServiceResult<MatchDetail> {
        let detail = self.load_in_club(club_id, id).await?;
        self.authorize(actor, &detail, MatchAction::View).await?;
        Ok(detail)
    }

    pub async fn update_in_club(
        &self,
        actor: &Actor,
        club_id: Uuid,
        id: Uuid,
        request: UpdateMatchRequest,
    ) -> ServiceResult<MatchDetail> {
        let detail = self.load_in_club(club_id, id).await?;
        self.apply_update(actor, detail, request).await
    }

    pub async fn delete_in_club(&self, actor: &Actor, club_id: Uuid, id: Uuid) -> ServiceResult<()> {
        let detail = self.load_in_club(club_id, id).await?;
        self.remove(actor, detail).await
    }

    /// Validates the merged record; court, event and roster changes are
    /// re-checked against the match's club when it has one.
    async fn apply_update(
        &self,
        actor: &Actor,
        detail: MatchDetail,
        request: UpdateMatchRequest,
    ) -> ServiceResult<MatchDetail> {
        self.authorize(actor, &detail, MatchAction::Update).await?;
        let current = &detail.record;

        let match_type = request.match_type.unwrap_or(current.match_type);
        let start_time = request.start_time.or(current.start_time);
        let end_time = request.end_time.or(current.end_time);
        let score = request.score.clone().or_else(|| current.score.clone());
        let roster = request
            .participants
            .clone()
            .unwrap_or_else(|| roster_inputs(&detail));

        guards::matches::validate_participants(match_type, &roster)?;
        guards::matches::validate_score(score.as_deref())?;
        guards::matches::validate_times(start_time, end_time)?;

        let mut court_id = current.court_id;
        if let Some(requested) = request.court_id {
            if current.court_id != Some(requested) {
                let court = self.ctx.load_court(requested).await?;
                guards::matches::validate_court(&court, current.club_id)?;
                court_id = Some(requested);
            }
        }

        let mut event_id = current.event_id;
        if let Some(requested) = request.event_id {
            if current.event_id != Some(requested) {
                match current.club_id {
                    Some(club_id) => self.ensure_event_in_club(requested, club_id).await?,
                    None => {
                        self.ctx.load_event(requested).await?;
                    }
                }
                event_id = Some(requested);
            }
        }

        if let Some(participants) = &request.participants {
            self.ensure_users_exist(participants).await?;
            if let Some(club_id) = current.club_id {
                self.ensure_active_members(club_id, participants).await?;
            }
        }

        let updated = self
            .ctx
            .store
            .update_match(
                current.id,
                MatchChanges {
                    match_type,
                    start_time,
                    end_time,
                    score,
                    completed: request.completed.unwrap_or(current.completed),
                    court_id,
                    event_id,
                    participants: request.participants,
                },
            )
            .await?;
        tracing::debug!("Match {} updated by {}", updated.record.id, actor.user_id);
        Ok(updated)
    }

    async fn remove(&self, actor: &Actor, detail: MatchDetail) -> ServiceResult<()> {
        self.authorize(actor, &detail, MatchAction::Delete).await?;
        self.ctx.store.delete_match(detail.record.id).await?;
        tracing::info!("Match {} deleted by {}", detail.record.id, actor.user_id);
        Ok(())
    }

    async fn insert(
        &self,
        actor: &Actor,
        club_id: Option<Uuid>,
        request: CreateMatchRequest,
    ) -> ServiceResult<MatchDetail> {
        Ok(self
            .ctx
            .store
            .create_match(NewMatch {
                match_type: request.match_type,
                start_time: request.start_time,
                end_time: request.end_time,
                score: request.score,
                completed: request.completed,
                club_id,
                court_id: request.court_id,
                event_id: request.event_id,
                creator_id: actor.user_id,
                participants: request.participants,
            })
            .await?)
    }

    fn validate_shape(&self, request: &CreateMatchRequest) -> ServiceResult<()> {
        guards::matches::validate_participants(request.match_type, &request.participants)?;
        guards::matches::validate_score(request.score.as_deref())?;
        guards::matches::validate_times(request.start_time, request.end_time)?;
        Ok(())
    }

    async fn ensure_users_exist(&self, participants: &[ParticipantInput]) -> ServiceResult<()> {
        let ids: Vec<Uuid> = participants.iter().map(|p| p.user_id).collect();
        let found = self.ctx.store.existing_user_ids(&ids).await?;
        if found.len() != ids.len() {
            return Err(ApiError::invalid_field(
                "participants",
                "One or more participants do not exist",
            ));
        }
        Ok(())
    }

    async fn ensure_active_members(
        &self,
        club_id: Uuid,
        participants: &[ParticipantInput],
    ) -> ServiceResult<()> {
        let ids: Vec<Uuid> = participants.iter().map(|p| p.user_id).collect();
        let active = self.ctx.store.active_member_ids(club_id, &ids).await?;
        if active.len() != ids.len() {
            return Err(ApiError::invalid_field(
                "participants",
                "All participants must be active members of the club",
            ));
        }
        Ok(())
    }

    async fn ensure_event_in_club(&self, event_id: Uuid, club_id: Uuid) -> ServiceResult<()> {
        let event = self.ctx.load_event(event_id).await?;
        if event.club_id != club_id {
            return Err(ApiError::invalid_field(
                "eventId",
                "Event does not belong to this club",
            ));
        }
        Ok(())
    }

    async fn authorize(&self, actor: &Actor, detail: &MatchDetail, action: MatchAction) -> ServiceResult<()> {
        let club = match detail.record.club_id {
            Some(club_id) => {
                let club = self.ctx.load_club(club_id).await?;
                Some(self.ctx.club_facts(&club, actor).await?)
            }
            None => None,
        };
        let facts = MatchFacts {
            creator_id: detail.record.creator_id,
            club,
            participant_ids: detail.participant_ids(),
        };
        authorize(actor, &facts, action)?;
        Ok(())
    }

    async fn club_for(&self, actor: &Actor, club_id: Uuid, action: ClubAction) -> ServiceResult<Club> {
        let club = self.ctx.load_club(club_id).await?;
        let facts = self.ctx.club_facts(&club, actor).await?;
        authorize(actor, &facts, action)?;
        Ok(club)
    }

    async fn load(&self, id: Uuid) -> ServiceResult<MatchDetail> {
        self.ctx
            .store
            .find_match(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Match not found"))
    }

    async fn load_in_club(&self, club_id: Uuid, id: Uuid) -> ServiceResult<MatchDetail> {
        self.ctx.load_club(club_id).await?;
        match self.load(id).await? {
            detail if detail.record.club_id == Some(club_id) => Ok(detail),
            _ => Err(ApiError::not_found("Match not found")),
        }
    }
}
