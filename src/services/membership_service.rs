use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::{ServiceContext, ServiceResult};
use crate::database::models::{Club, MemberView, MembershipChanges, NewMembership, UserSummary};
use crate::database::{MembershipStore, Page, PageParams, UserStore};
use crate::error::ApiError;
use crate::guards;
use crate::policy::{authorize, Actor, ClubAction};
use crate::types::MembershipStatus;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberListQuery {
    pub status: Option<MembershipStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: Uuid,
    pub status: Option<MembershipStatus>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRequest {
    pub status: MembershipStatus,
    pub expires_at: Option<DateTime<Utc>>,
}

pub struct MembershipService<'a> {
    ctx: ServiceContext<'a>,
}

impl<'a> MembershipService<'a> {
    pub fn new(ctx: ServiceContext<'a>) -> Self {
        Self { ctx }
    }

    pub async fn list(
        &self,
        actor: &Actor,
        club_id: Uuid,
        query: MemberListQuery,
    ) -> ServiceResult<Page<MemberView>> {
        let club = self.club_for(actor, club_id, ClubAction::ViewMembers).await?;
        let page = self.ctx.page(PageParams { page: query.page, limit: query.limit });
        Ok(self.ctx.store.list_members(club.id, query.status, page).await?)
    }

    pub async fn add(
        &self,
        actor: &Actor,
        club_id: Uuid,
        request: AddMemberRequest,
    ) -> ServiceResult<MemberView> {
        let club = self.club_for(actor, club_id, ClubAction::ManageMembers).await?;

        let user = self
            .ctx
            .store
            .find_user(request.user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;
        let existing = self.ctx.store.find_membership(user.id, club.id).await?;
        guards::membership::can_add(existing.as_ref())?;

        let status = request.status.unwrap_or(MembershipStatus::Pending);
        guards::membership::validate_initial_status(status)?;

        let membership = self
            .ctx
            .store
            .create_membership(NewMembership {
                user_id: user.id,
                club_id: club.id,
                status,
                expires_at: request.expires_at,
            })
            .await?;

        Ok(MemberView {
            membership,
            user: UserSummary::from(&user),
        })
    }

    pub async fn update(
        &self,
        actor: &Actor,
        club_id: Uuid,
        user_id: Uuid,
        request: UpdateMemberRequest,
    ) -> ServiceResult<MemberView> {
        let club = self.club_for(actor, club_id, ClubAction::ManageMembers).await?;
        let current = self
            .ctx
            .store
            .find_membership(user_id, club.id)
            .await?
            .ok_or_else(|| ApiError::not_found("Membership not found"))?;

        let status = guards::membership::transition(current.status, request.status)?;
        if status != current.status {
            tracing::debug!(
                "Membership {} moves from {:?} to {:?}",
                current.id,
                current.status,
                status
            );
        }

        let membership = self
            .ctx
            .store
            .update_membership(
                current.id,
                MembershipChanges {
                    status,
                    expires_at: request.expires_at.or(current.expires_at),
                },
            )
            .await?;
        let user = self
            .ctx
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        Ok(MemberView {
            membership,
            user: UserSummary::from(&user),
        })
    }

    pub async fn remove(&self, actor: &Actor, club_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        let club = self.club_for(actor, club_id, ClubAction::ManageMembers).await?;
        guards::membership::can_remove(club.creator_id, user_id)?;

        let membership = self
            .ctx
            .store
            .find_membership(user_id, club.id)
            .await?
            .ok_or_else(|| ApiError::not_found("Membership not found"))?;
        self.ctx.store.delete_membership(membership.id).await?;
        Ok(())
    }

    async fn club_for(&self, actor: &Actor, club_id: Uuid, action: ClubAction) -> ServiceResult<Club> {
        let club = self.ctx.load_club(club_id).await?;
        let facts = self.ctx.club_facts(&club, actor).await?;
        authorize(actor, &facts, action)?;
        Ok(club)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::services::club_service::{tests::request, ClubService};
    use crate::services::testing::{actor, state};
    use crate::types::Role;

    #[tokio::test]
    async fn add_defaults_to_pending_and_rejects_duplicates() {
        let state = state();
        let ctx = ServiceContext::new(&state);
        let owner = actor(&state, "owner", Role::User).await;
        let player = actor(&state, "player", Role::User).await;
        let club = ClubService::new(ctx).create(&owner, request("Dink Society")).await.unwrap();
        let service = MembershipService::new(ctx);

        let add = AddMemberRequest {
            user_id: player.user_id,
            status: None,
            expires_at: None,
        };
        let member = service.add(&owner, club.id, add.clone()).await.unwrap();
        assert_eq!(member.membership.status, MembershipStatus::Pending);

        let err = service.add(&owner, club.id, add).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn members_cannot_list_members() {
        let state = state();
        let ctx = ServiceContext::new(&state);
        let owner = actor(&state, "owner", Role::User).await;
        let player = actor(&state, "player", Role::User).await;
        let club = ClubService::new(ctx).create(&owner, request("Dink Society")).await.unwrap();
        let service = MembershipService::new(ctx);
        service
            .add(
                &owner,
                club.id,
                AddMemberRequest {
                    user_id: player.user_id,
                    status: Some(MembershipStatus::Active),
                    expires_at: None,
                },
            )
            .await
            .unwrap();

        let err = service
            .list(&player, club.id, MemberListQuery::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let page = service.list(&owner, club.id, MemberListQuery::default()).await.unwrap();
        assert_eq!(page.pagination.total_count, 2);
    }

    #[tokio::test]
    async fn any_status_may_follow_any_other() {
        let state = state();
        let ctx = ServiceContext::new(&state);
        let owner = actor(&state, "owner", Role::User).await;
        let player = actor(&state, "player", Role::User).await;
        let club = ClubService::new(ctx).create(&owner, request("Dink Society")).await.unwrap();
        let service = MembershipService::new(ctx);
        service
            .add(&owner, club.id, AddMemberRequest { user_id: player.user_id, status: None, expires_at: None })
            .await
            .unwrap();

        for status in [
            MembershipStatus::Cancelled,
            MembershipStatus::Active,
            MembershipStatus::Inactive,
            MembershipStatus::Pending,
        ] {
            let updated = service
                .update(&owner, club.id, player.user_id, UpdateMemberRequest { status, expires_at: None })
                .await
                .unwrap();
            assert_eq!(updated.membership.status, status);
        }
    }

    #[tokio::test]
    async fn creator_membership_cannot_be_removed() {
        let state = state();
        let ctx = ServiceContext::new(&state);
        let owner = actor(&state, "owner", Role::User).await;
        let root = actor(&state, "root", Role::SuperAdmin).await;
        let club = ClubService::new(ctx).create(&owner, request("Dink Society")).await.unwrap();
        let service = MembershipService::new(ctx);

        for remover in [&owner, &root] {
            let err = service.remove(remover, club.id, owner.user_id).await.unwrap_err();
            assert_eq!(err.status_code(), StatusCode::CONFLICT);
        }
    }
}
