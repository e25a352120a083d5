//! Authorization policy evaluator.
//!
//! Each resource type exposes a small set of relational facts about the target
//! (who created the club, the actor's membership status, the match roster) and
//! implements [`Policy`] over its own action enum. Evaluation is pure: callers
//! load the facts, ask for a [`Decision`], and only mutate after a permit.

use std::fmt::Debug;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::types::{MembershipStatus, Role};

pub mod club;
pub mod event;
pub mod matches;
pub mod user;

pub use club::{ClubAction, ClubFacts};
pub use event::{EventAction, EventFacts};
pub use matches::{MatchAction, MatchFacts};
pub use user::{UserAction, UserFacts};

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),
}

/// Identity resolved from a verified bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl Actor {
    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Permit,
    Deny(String),
}

impl Decision {
    pub fn is_permit(&self) -> bool {
        matches!(self, Decision::Permit)
    }

    /// Permit when `allowed`, otherwise deny with `reason`
    pub fn from_bool(allowed: bool, reason: impl Into<String>) -> Self {
        if allowed {
            Decision::Permit
        } else {
            Decision::Deny(reason.into())
        }
    }
}

pub trait Policy {
    type Action: Copy + Debug;

    fn evaluate(&self, actor: &Actor, action: Self::Action) -> Decision;
}

/// Evaluate `action` against `target`, turning a deny into [`PolicyError::Forbidden`]
pub fn authorize<P: Policy>(actor: &Actor, target: &P, action: P::Action) -> Result<(), PolicyError> {
    match target.evaluate(actor, action) {
        Decision::Permit => {
            tracing::debug!("Permit {:?} for user {}", action, actor.user_id);
            Ok(())
        }
        Decision::Deny(reason) => {
            tracing::warn!("Deny {:?} for user {}: {}", action, actor.user_id, reason);
            Err(PolicyError::Forbidden(reason))
        }
    }
}

/// Require an authenticated actor for operations open to anonymous callers elsewhere
pub fn require_actor(actor: Option<&Actor>) -> Result<&Actor, PolicyError> {
    actor.ok_or_else(|| PolicyError::Unauthenticated("Authentication required".to_string()))
}

/// True iff the actor is a SUPER_ADMIN or created the club
pub fn can_manage_club(actor: &Actor, club_creator_id: Uuid) -> bool {
    actor.is_super_admin() || actor.user_id == club_creator_id
}

pub(crate) fn is_active(membership: Option<MembershipStatus>) -> bool {
    membership == Some(MembershipStatus::Active)
}


#[cfg(test)]
mod tests {
    use super::fixtures::{admin, user};
    use super::*;

    #[test]
    fn manage_club_iff_admin_or_creator() {
        let creator = user();
        let other = user();
        let root = admin();

        assert!(can_manage_club(&creator, creator.user_id));
        assert!(!can_manage_club(&other, creator.user_id));
        assert!(can_manage_club(&root, creator.user_id));
    }

    #[test]
    fn authorize_maps_deny_to_forbidden() {
        let club = ClubFacts::new(Uuid::new_v4(), None);
        let err = authorize(&user(), &club, ClubAction::Delete).unwrap_err();
        assert!(matches!(err, PolicyError::Forbidden(_)));
    }

    #[test]
    fn anonymous_actor_is_unauthenticated() {
        assert!(matches!(require_actor(None), Err(PolicyError::Unauthenticated(_))));
        let actor = user();
        assert_eq!(require_actor(Some(&actor)).unwrap().user_id, actor.user_id);
    }
}
