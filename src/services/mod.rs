//! Per-resource orchestration.
//!
//! Every mutating operation follows the same order: load the target and the
//! relational facts about the actor, evaluate the policy, run the lifecycle
//! guard, then issue a single store mutation.

use uuid::Uuid;

use crate::config::AppConfig;
use crate::database::models::{Club, Court, Event};
use crate::database::{ClubStore, CourtStore, EventStore, MembershipStore, PageParams, Pagination, Store};
use crate::error::ApiError;
use crate::policy::{Actor, ClubFacts};
use crate::state::AppState;

pub mod auth_service;
pub mod club_service;
pub mod court_service;
pub mod event_service;
pub mod match_service;
pub mod membership_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use club_service::ClubService;
pub use court_service::CourtService;
pub use event_service::EventService;
pub use match_service::MatchService;
pub use membership_service::MembershipService;
pub use user_service::UserService;

pub type ServiceResult<T> = Result<T, ApiError>;

/// Borrowed view of the application state shared by all services
#[derive(Clone, Copy)]
pub struct ServiceContext<'a> {
    pub store: &'a dyn Store,
    pub config: &'a AppConfig,
}

impl<'a> ServiceContext<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self {
            store: state.store.as_ref(),
            config: state.config.as_ref(),
        }
    }

    /// Falls back to the configured default page size
    pub fn page(&self, params: PageParams) -> Pagination {
        self.page_with_default(params, self.config.api.default_page_limit)
    }

    pub fn page_with_default(&self, params: PageParams, default_limit: u32) -> Pagination {
        params.resolve(default_limit, self.config.api.max_page_limit)
    }

    pub async fn load_club(&self, id: Uuid) -> ServiceResult<Club> {
        self.store
            .find_club(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Club not found"))
    }

    pub async fn load_court(&self, id: Uuid) -> ServiceResult<Court> {
        self.store
            .find_court(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Court not found"))
    }

    pub async fn load_event(&self, id: Uuid) -> ServiceResult<Event> {
        self.store
            .find_event(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Event not found"))
    }

    /// Relational facts about `club` from the actor's point of view
    pub async fn club_facts(&self, club: &Club, actor: &Actor) -> ServiceResult<ClubFacts> {
        let membership = self.store.find_membership(actor.user_id, club.id).await?;
        Ok(ClubFacts::new(club.creator_id, membership.map(|m| m.status)))
    }
}

/// Trimmed, non-empty and at most `max` characters
pub(crate) fn required_text(field: &str, value: &str, max: usize) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::invalid_field(field, format!("{} is required", field)));
    }
    if trimmed.chars().count() > max {
        return Err(ApiError::invalid_field(
            field,
            format!("{} must be at most {} characters", field, max),
        ));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn is_http_url(value: &str) -> bool {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.starts_with('/'))
}

pub(crate) fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::database::MemoryStore;

    #[test]
    fn text_is_trimmed_and_bounded() {
        assert_eq!(required_text("name", "  Ace  ", 10).unwrap(), "Ace");
        assert!(required_text("name", "   ", 10).is_err());
        assert!(required_text("name", &"x".repeat(11), 10).is_err());
    }

    #[test]
    fn url_and_email_shapes() {
        assert!(is_http_url("https://club.example.com"));
        assert!(is_http_url("http://club.example.com/logo.png"));
        assert!(!is_http_url("ftp://club.example.com"));
        assert!(!is_http_url("https://"));
        assert!(is_email("owner@club.com"));
        assert!(!is_email("owner.club.com"));
        assert!(!is_email("@club.com"));
    }

    #[test]
    fn page_size_defaults_come_from_config() {
        let mut config = AppConfig::development();
        config.api.default_page_limit = 7;
        config.api.max_page_limit = 50;
        let state = AppState::new(Arc::new(MemoryStore::new()), Arc::new(config));
        let ctx = ServiceContext::new(&state);

        assert_eq!(ctx.page(PageParams::default()).limit, 7);
        assert_eq!(ctx.page(PageParams { page: Some(2), limit: Some(500) }).limit, 50);
        assert_eq!(ctx.page_with_default(PageParams::default(), 10).limit, 10);
    }
}
