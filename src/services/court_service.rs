use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::{required_text, ServiceContext, ServiceResult};
use crate::database::models::{Club, Court, CourtChanges, CourtDeletion, NewCourt};
use crate::database::{CourtStore, Page, PageParams};
use crate::error::ApiError;
use crate::guards;
use crate::policy::{authorize, Actor, ClubAction};

const DUPLICATE_COURT: &str = "A court with this name already exists in this club";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtListQuery {
    pub is_active: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourtRequest {
    pub name: String,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourtRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

pub struct CourtService<'a> {
    ctx: ServiceContext<'a>,
}

impl<'a> CourtService<'a> {
    pub fn new(ctx: ServiceContext<'a>) -> Self {
        Self { ctx }
    }

    pub async fn list(&self, club_id: Uuid, query: CourtListQuery) -> ServiceResult<Page<Court>> {
        let club = self.ctx.load_club(club_id).await?;
        let page = self.ctx.page(PageParams { page: query.page, limit: query.limit });
        Ok(self.ctx.store.list_courts(club.id, query.is_active, page).await?)
    }

    pub async fn get(&self, club_id: Uuid, court_id: Uuid) -> ServiceResult<Court> {
        self.ctx.load_club(club_id).await?;
        self.court_in_club(club_id, court_id).await
    }

    pub async fn create(
        &self,
        actor: &Actor,
        club_id: Uuid,
        request: CreateCourtRequest,
    ) -> ServiceResult<Court> {
        let club = self.managed_club(actor, club_id).await?;
        let name = required_text("name", &request.name, 100)?;

        if self.ctx.store.find_court_by_name(club.id, &name).await?.is_some() {
            return Err(ApiError::conflict(DUPLICATE_COURT));
        }

        Ok(self
            .ctx
            .store
            .create_court(NewCourt {
                club_id: club.id,
                name,
                description: request.description,
                is_active: request.is_active.unwrap_or(true),
            })
            .await?)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        club_id: Uuid,
        court_id: Uuid,
        request: UpdateCourtRequest,
    ) -> ServiceResult<Court> {
        let club = self.managed_club(actor, club_id).await?;
        let court = self.court_in_club(club.id, court_id).await?;

        let name = request
            .name
            .as_deref()
            .map(|v| required_text("name", v, 100))
            .transpose()?;
        if let Some(name) = &name {
            if let Some(other) = self.ctx.store.find_court_by_name(club.id, name).await? {
                if other.id != court.id {
                    return Err(ApiError::conflict(DUPLICATE_COURT));
                }
            }
        }

        if court.is_active && request.is_active == Some(false) {
            let future_events = self.ctx.store.count_future_events(court.id, Utc::now()).await?;
            guards::court::can_deactivate(future_events)?;
        }

        Ok(self
            .ctx
            .store
            .update_court(
                court.id,
                CourtChanges {
                    name,
                    description: request.description,
                    is_active: request.is_active,
                },
            )
            .await?)
    }

    /// Deletes the court and reports how many events and matches went with it
    pub async fn delete(
        &self,
        actor: &Actor,
        club_id: Uuid,
        court_id: Uuid,
    ) -> ServiceResult<CourtDeletion> {
        let club = self.managed_club(actor, club_id).await?;
        let court = self.court_in_club(club.id, court_id).await?;

        let future_events = self.ctx.store.count_future_events(court.id, Utc::now()).await?;
        let incomplete_matches = self.ctx.store.count_incomplete_matches(court.id).await?;
        guards::court::can_delete(future_events, incomplete_matches)?;

        let deletion = self.ctx.store.delete_court(court.id).await?;
        tracing::info!(
            "Court {} deleted with {} events and {} matches",
            court.id,
            deletion.events_deleted,
            deletion.matches_deleted
        );
        Ok(deletion)
    }

    async fn managed_club(&self, actor: &Actor, club_id: Uuid) -> ServiceResult<Club> {
        let club = self.ctx.load_club(club_id).await?;
        let facts = self.ctx.club_facts(&club, actor).await?;
        authorize(actor, &facts, ClubAction::ManageCourts)?;
        Ok(club)
    }

    async fn court_in_club(&self, club_id: Uuid, court_id: Uuid) -> ServiceResult<Court> {
        match self.ctx.store.find_court(court_id).await? {
            Some(court) if court.club_id == club_id => Ok(court),
            _ => Err(ApiError::not_found("Court not found")),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::Duration;

    use super::*;
    use crate::database::models::NewEvent;
    use crate::database::EventStore;
    use crate::services::club_service::{tests::request, ClubService};
    use crate::services::testing::{actor, state};
    use crate::types::{EventType, EventVisibility, Role};

    fn court(name: &str) -> CreateCourtRequest {
        CreateCourtRequest {
            name: name.to_string(),
            description: None,
            is_active: None,
        }
    }

    #[tokio::test]
    async fn court_names_unique_per_club() {
        let state = state();
        let ctx = ServiceContext::new(&state);
        let owner = actor(&state, "owner", Role::User).await;
        let club = ClubService::new(ctx).create(&owner, request("Dink Society")).await.unwrap();
        let service = CourtService::new(ctx);

        let first = service.create(&owner, club.id, court("Center")).await.unwrap();
        assert!(first.is_active);
        let err = service.create(&owner, club.id, court("Center")).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let stranger = actor(&state, "stranger", Role::User).await;
        let err = service.create(&stranger, club.id, court("Side")).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn scheduled_event_blocks_deactivation_and_delete() {
        let state = state();
        let ctx = ServiceContext::new(&state);
        let owner = actor(&state, "owner", Role::User).await;
        let club = ClubService::new(ctx).create(&owner, request("Dink Society")).await.unwrap();
        let service = CourtService::new(ctx);
        let center = service.create(&owner, club.id, court("Center")).await.unwrap();

        let start = Utc::now() + Duration::days(1);
        state
            .store
            .create_event(NewEvent {
                club_id: club.id,
                court_id: Some(center.id),
                title: "Ladder night".to_string(),
                description: None,
                event_type: EventType::League,
                visibility: EventVisibility::Open,
                start_date_time: start,
                end_date_time: start + Duration::hours(2),
                max_participants: None,
                price: None,
            })
            .await
            .unwrap();

        let deactivate = UpdateCourtRequest {
            is_active: Some(false),
            ..Default::default()
        };
        let err = service
            .update(&owner, club.id, center.id, deactivate)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err = service.delete(&owner, club.id, center.id).await.unwrap_err();
        assert_eq!(err.to_json()["details"]["futureEvents"], 1);
    }
}
