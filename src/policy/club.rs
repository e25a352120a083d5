use uuid::Uuid;

use super::{can_manage_club, is_active, Actor, Decision, Policy};
use crate::types::MembershipStatus;

/// Relational facts about a club as seen by one actor
#[derive(Debug, Clone)]
pub struct ClubFacts {
    pub creator_id: Uuid,
    pub actor_membership: Option<MembershipStatus>,
}

impl ClubFacts {
    pub fn new(creator_id: Uuid, actor_membership: Option<MembershipStatus>) -> Self {
        Self {
            creator_id,
            actor_membership,
        }
    }

    pub fn is_creator(&self, actor: &Actor) -> bool {
        actor.user_id == self.creator_id
    }

    pub fn is_active_member(&self) -> bool {
        is_active(self.actor_membership)
    }

    /// Creator, ACTIVE member or SUPER_ADMIN
    pub fn is_insider(&self, actor: &Actor) -> bool {
        can_manage_club(actor, self.creator_id) || self.is_active_member()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClubAction {
    Update,
    Delete,
    ManageCourts,
    ViewMembers,
    ManageMembers,
    ManageEvents,
    ManageMatches,
    ViewMatches,
}

impl Policy for ClubFacts {
    type Action = ClubAction;

    fn evaluate(&self, actor: &Actor, action: ClubAction) -> Decision {
        if action == ClubAction::ViewMatches {
            return Decision::from_bool(
                self.is_insider(actor),
                "only club members can view club matches",
            );
        }

        // Every club-level mutation and the member roster are owner-or-admin
        let reason = match action {
            ClubAction::Update => "only the club creator can update this club",
            ClubAction::Delete => "only the club creator can delete this club",
            ClubAction::ManageCourts => "only the club creator can manage courts",
            ClubAction::ViewMembers => "only the club creator can view members",
            ClubAction::ManageMembers => "only the club creator can manage members",
            ClubAction::ManageEvents => "only the club creator can manage events",
            ClubAction::ManageMatches | ClubAction::ViewMatches => {
                "only the club creator can manage club matches"
            }
        };
        Decision::from_bool(can_manage_club(actor, self.creator_id), reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::fixtures::{admin, user};

    const ALL: [ClubAction; 7] = [
        ClubAction::Update,
        ClubAction::Delete,
        ClubAction::ManageCourts,
        ClubAction::ViewMembers,
        ClubAction::ManageMembers,
        ClubAction::ManageEvents,
        ClubAction::ManageMatches,
    ];

    #[test]
    fn creator_and_admin_may_do_everything() {
        let creator = user();
        let club = ClubFacts::new(creator.user_id, Some(MembershipStatus::Active));
        for action in ALL {
            assert!(club.evaluate(&creator, action).is_permit());
            assert!(club.evaluate(&admin(), action).is_permit());
        }
    }

    #[test]
    fn active_members_cannot_list_or_manage() {
        let club = ClubFacts::new(Uuid::new_v4(), Some(MembershipStatus::Active));
        for action in ALL {
            assert!(!club.evaluate(&user(), action).is_permit(), "{:?}", action);
        }
    }

    #[test]
    fn active_members_see_club_matches() {
        let member = ClubFacts::new(Uuid::new_v4(), Some(MembershipStatus::Active));
        let pending = ClubFacts::new(Uuid::new_v4(), Some(MembershipStatus::Pending));
        assert!(member.evaluate(&user(), ClubAction::ViewMatches).is_permit());
        assert!(!pending.evaluate(&user(), ClubAction::ViewMatches).is_permit());
        assert!(pending.evaluate(&admin(), ClubAction::ViewMatches).is_permit());
    }

    #[test]
    fn insider_includes_active_members_only() {
        let actor = user();
        assert!(ClubFacts::new(Uuid::new_v4(), Some(MembershipStatus::Active)).is_insider(&actor));
        assert!(!ClubFacts::new(Uuid::new_v4(), Some(MembershipStatus::Pending)).is_insider(&actor));
        assert!(!ClubFacts::new(Uuid::new_v4(), None).is_insider(&actor));
    }
}
