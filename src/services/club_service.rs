use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{is_email, is_http_url, required_text, ServiceContext, ServiceResult};
use crate::database::models::{Club, ClubChanges, ClubFilter, Court, NewClub};
use crate::database::{ClubStore, CourtStore, Page, PageParams, Pagination};
use crate::error::ApiError;
use crate::policy::{authorize, Actor, ClubAction};

const CLUB_PAGE_LIMIT: u32 = 10;
const DUPLICATE_CLUB: &str = "A club with this name already exists in this city";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubListQuery {
    pub city: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClubRequest {
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClubRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubListItem {
    #[serde(flatten)]
    pub club: Club,
    pub member_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubDetail {
    #[serde(flatten)]
    pub club: Club,
    pub member_count: i64,
    pub courts: Vec<Court>,
}

fn validate_contact(
    email: Option<&str>,
    website: Option<&str>,
    logo: Option<&str>,
) -> ServiceResult<()> {
    if let Some(email) = email {
        if !is_email(email) {
            return Err(ApiError::invalid_field("email", "Invalid email address"));
        }
    }
    if let Some(website) = website {
        if !is_http_url(website) {
            return Err(ApiError::invalid_field("website", "Website must be an http(s) URL"));
        }
    }
    if let Some(logo) = logo {
        if !is_http_url(logo) {
            return Err(ApiError::invalid_field("logo", "Logo must be an http(s) URL"));
        }
    }
    Ok(())
}

pub struct ClubService<'a> {
    ctx: ServiceContext<'a>,
}

impl<'a> ClubService<'a> {
    pub fn new(ctx: ServiceContext<'a>) -> Self {
        Self { ctx }
    }

    pub async fn list(&self, query: ClubListQuery) -> ServiceResult<Page<ClubListItem>> {
        let filter = ClubFilter {
            city: query.city,
            search: query.search,
        };
        let params = PageParams { page: query.page, limit: query.limit };
        let page = self.ctx.page_with_default(params, CLUB_PAGE_LIMIT);
        let clubs = self.ctx.store.list_clubs(&filter, page).await?;

        let mut items = Vec::with_capacity(clubs.items.len());
        for club in clubs.items {
            let member_count = self.ctx.store.count_members(club.id).await?;
            items.push(ClubListItem { club, member_count });
        }
        Ok(Page {
            items,
            pagination: clubs.pagination,
        })
    }

    /// Club with its active courts
    pub async fn get(&self, id: Uuid) -> ServiceResult<ClubDetail> {
        let club = self.ctx.load_club(id).await?;
        let member_count = self.ctx.store.count_members(club.id).await?;
        let courts = self
            .ctx
            .store
            .list_courts(club.id, Some(true), Pagination::new(1, self.ctx.config.api.max_page_limit))
            .await?
            .items;
        Ok(ClubDetail {
            club,
            member_count,
            courts,
        })
    }

    pub async fn create(&self, actor: &Actor, request: CreateClubRequest) -> ServiceResult<Club> {
        let name = required_text("name", &request.name, 100)?;
        let address = required_text("address", &request.address, 255)?;
        let city = required_text("city", &request.city, 100)?;
        validate_contact(
            request.email.as_deref(),
            request.website.as_deref(),
            request.logo.as_deref(),
        )?;

        if self.ctx.store.find_club_by_name_and_city(&name, &city).await?.is_some() {
            return Err(ApiError::conflict(DUPLICATE_CLUB));
        }

        let club = self
            .ctx
            .store
            .create_club(NewClub {
                name,
                description: request.description,
                address,
                city,
                phone: request.phone,
                email: request.email,
                website: request.website,
                logo: request.logo,
                creator_id: actor.user_id,
            })
            .await?;

        tracing::info!("Club {} created by {}", club.id, actor.user_id);
        Ok(club)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        request: UpdateClubRequest,
    ) -> ServiceResult<Club> {
        let club = self.ctx.load_club(id).await?;
        let facts = self.ctx.club_facts(&club, actor).await?;
        authorize(actor, &facts, ClubAction::Update)?;

        let changes = ClubChanges {
            name: request.name.as_deref().map(|v| required_text("name", v, 100)).transpose()?,
            address: request
                .address
                .as_deref()
                .map(|v| required_text("address", v, 255))
                .transpose()?,
            city: request.city.as_deref().map(|v| required_text("city", v, 100)).transpose()?,
            description: request.description,
            phone: request.phone,
            email: request.email,
            website: request.website,
            logo: request.logo,
        };
        validate_contact(
            changes.email.as_deref(),
            changes.website.as_deref(),
            changes.logo.as_deref(),
        )?;

        let name = changes.name.as_deref().unwrap_or(&club.name);
        let city = changes.city.as_deref().unwrap_or(&club.city);
        if let Some(other) = self.ctx.store.find_club_by_name_and_city(name, city).await? {
            if other.id != club.id {
                return Err(ApiError::conflict(DUPLICATE_CLUB));
            }
        }

        Ok(self.ctx.store.update_club(club.id, changes).await?)
    }

    /// Removes the club together with its courts, memberships, events and matches
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> ServiceResult<()> {
        let club = self.ctx.load_club(id).await?;
        let facts = self.ctx.club_facts(&club, actor).await?;
        authorize(actor, &facts, ClubAction::Delete)?;

        self.ctx.store.delete_club(club.id).await?;
        tracing::info!("Club {} deleted by {}", club.id, actor.user_id);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::database::MembershipStore;
    use crate::services::testing::{actor, state};
    use crate::types::{MembershipStatus, Role};

    pub fn request(name: &str) -> CreateClubRequest {
        CreateClubRequest {
            name: name.to_string(),
            description: Some("Friendly doubles".to_string()),
            address: "1 Baseline Ave".to_string(),
            city: "Austin".to_string(),
            phone: None,
            email: Some("hello@club.com".to_string()),
            website: Some("https://club.com".to_string()),
            logo: None,
        }
    }

    #[tokio::test]
    async fn creator_gets_active_membership() {
        let state = state();
        let service = ClubService::new(ServiceContext::new(&state));
        let owner = actor(&state, "owner", Role::User).await;

        let club = service.create(&owner, request("Dink Society")).await.unwrap();
        let membership = state
            .store
            .find_membership(owner.user_id, club.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(membership.status, MembershipStatus::Active);

        let detail = service.get(club.id).await.unwrap();
        assert_eq!(detail.member_count, 1);
    }

    #[tokio::test]
    async fn name_and_city_are_unique() {
        let state = state();
        let service = ClubService::new(ServiceContext::new(&state));
        let owner = actor(&state, "owner", Role::User).await;

        service.create(&owner, request("Dink Society")).await.unwrap();
        let err = service.create(&owner, request("Dink Society")).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let mut elsewhere = request("Dink Society");
        elsewhere.city = "Dallas".to_string();
        service.create(&owner, elsewhere).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_bad_contact_fields() {
        let state = state();
        let service = ClubService::new(ServiceContext::new(&state));
        let owner = actor(&state, "owner", Role::User).await;

        let mut bad = request("Dink Society");
        bad.website = Some("club.com".to_string());
        let err = service.create(&owner, bad).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_json()["field_errors"]["website"].is_string());
    }

    #[tokio::test]
    async fn only_creator_or_admin_updates() {
        let state = state();
        let service = ClubService::new(ServiceContext::new(&state));
        let owner = actor(&state, "owner", Role::User).await;
        let stranger = actor(&state, "stranger", Role::User).await;
        let root = actor(&state, "root", Role::SuperAdmin).await;
        let club = service.create(&owner, request("Dink Society")).await.unwrap();

        let rename = UpdateClubRequest {
            name: Some("Kitchen Club".to_string()),
            ..Default::default()
        };
        let err = service.update(&stranger, club.id, rename.clone()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let updated = service.update(&root, club.id, rename).await.unwrap();
        assert_eq!(updated.name, "Kitchen Club");

        service.delete(&owner, club.id).await.unwrap();
        assert_eq!(
            service.get(club.id).await.unwrap_err().status_code(),
            StatusCode::NOT_FOUND
        );
    }
}
