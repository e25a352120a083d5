use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::{ServiceContext, ServiceResult};
use crate::database::models::{MatchDetail, MatchFilter, MatchKind, MatchStats, User, UserFilter, UserSummary};
use crate::database::{MatchStore, Page, PageParams, UserStore};
use crate::error::ApiError;
use crate::policy::{authorize, Actor, UserAction, UserFacts};
use crate::types::{MatchType, Role};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub search: Option<String>,
    pub city: Option<String>,
    pub role: Option<Role>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMatchesQuery {
    pub match_type: Option<MatchType>,
    pub completed: Option<bool>,
    pub kind: Option<MatchKind>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMatches {
    pub user: UserSummary,
    pub matches: Page<MatchDetail>,
    pub stats: MatchStats,
}

pub struct UserService<'a> {
    ctx: ServiceContext<'a>,
}

impl<'a> UserService<'a> {
    pub fn new(ctx: ServiceContext<'a>) -> Self {
        Self { ctx }
    }

    pub async fn list(&self, actor: &Actor, query: UserListQuery) -> ServiceResult<Page<User>> {
        authorize(actor, &UserFacts { user_id: actor.user_id }, UserAction::View)?;

        let filter = UserFilter {
            search: query.search,
            city: query.city,
            role: query.role,
        };
        let page = self.ctx.page(PageParams { page: query.page, limit: query.limit });
        Ok(self.ctx.store.list_users(&filter, page).await?)
    }

    pub async fn get(&self, actor: &Actor, id: Uuid) -> ServiceResult<User> {
        authorize(actor, &UserFacts { user_id: id }, UserAction::View)?;
        self.load(id).await
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> ServiceResult<()> {
        authorize(actor, &UserFacts { user_id: id }, UserAction::Delete)?;
        let user = self.load(id).await?;

        let clubs_created = self.ctx.store.count_clubs_created(user.id).await?;
        if clubs_created > 0 {
            return Err(ApiError::conflict_with(
                "Cannot delete a user who created clubs. Transfer or delete the clubs first.",
                json!({ "clubsCreated": clubs_created }),
            ));
        }

        self.ctx.store.delete_user(user.id).await?;
        tracing::info!("User {} deleted by {}", user.id, actor.user_id);
        Ok(())
    }

    /// Matches the user plays in, with a win summary
    pub async fn matches(
        &self,
        actor: &Actor,
        user_id: Uuid,
        query: UserMatchesQuery,
    ) -> ServiceResult<UserMatches> {
        authorize(actor, &UserFacts { user_id }, UserAction::ViewMatches)?;
        let user = self.load(user_id).await?;

        let filter = MatchFilter {
            kind: query.kind,
            match_type: query.match_type,
            completed: query.completed,
            participant_id: Some(user_id),
            ..Default::default()
        };
        let page = self.ctx.page(PageParams { page: query.page, limit: query.limit });
        let matches = self.ctx.store.list_matches(&filter, page).await?;
        let stats = self.ctx.store.match_stats(&filter).await?;

        Ok(UserMatches {
            user: UserSummary::from(&user),
            matches,
            stats,
        })
    }

    async fn load(&self, id: Uuid) -> ServiceResult<User> {
        self.ctx
            .store
            .find_user(id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }
}
