use super::{can_manage_club, Actor, ClubFacts, Decision, Policy};
use crate::types::EventVisibility;

#[derive(Debug, Clone)]
pub struct EventFacts {
    pub visibility: EventVisibility,
    pub club: ClubFacts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    View,
    Join,
    CheckInOther,
    Manage,
    ViewParticipants,
}

impl Policy for EventFacts {
    type Action = EventAction;

    fn evaluate(&self, actor: &Actor, action: EventAction) -> Decision {
        match action {
            EventAction::View => match self.visibility {
                EventVisibility::Private => Decision::from_bool(
                    self.club.is_insider(actor),
                    "this event is private to club members",
                ),
                EventVisibility::Open | EventVisibility::MembersOnly => Decision::Permit,
            },
            EventAction::Join => match self.visibility {
                EventVisibility::Open => Decision::Permit,
                EventVisibility::MembersOnly | EventVisibility::Private => Decision::from_bool(
                    self.club.is_insider(actor),
                    "only active club members can join this event",
                ),
            },
            EventAction::CheckInOther => Decision::from_bool(
                can_manage_club(actor, self.club.creator_id),
                "only the club creator can check in other users",
            ),
            EventAction::Manage => Decision::from_bool(
                can_manage_club(actor, self.club.creator_id),
                "only the club creator can manage this event",
            ),
            EventAction::ViewParticipants => Decision::from_bool(
                self.club.is_insider(actor),
                "only club members can view participants",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::fixtures::{admin, user};
    use crate::types::MembershipStatus;
    use uuid::Uuid;

    fn event(visibility: EventVisibility, membership: Option<MembershipStatus>) -> EventFacts {
        EventFacts {
            visibility,
            club: ClubFacts::new(Uuid::new_v4(), membership),
        }
    }

    #[test]
    fn open_events_are_joinable_by_anyone() {
        assert!(event(EventVisibility::Open, None).evaluate(&user(), EventAction::Join).is_permit());
    }

    #[test]
    fn members_only_join_requires_active_membership() {
        let outsider = event(EventVisibility::MembersOnly, None);
        let pending = event(EventVisibility::MembersOnly, Some(MembershipStatus::Pending));
        let member = event(EventVisibility::MembersOnly, Some(MembershipStatus::Active));

        assert!(!outsider.evaluate(&user(), EventAction::Join).is_permit());
        assert!(!pending.evaluate(&user(), EventAction::Join).is_permit());
        assert!(member.evaluate(&user(), EventAction::Join).is_permit());
        assert!(outsider.evaluate(&admin(), EventAction::Join).is_permit());
    }

    #[test]
    fn private_events_hidden_from_outsiders() {
        let creator = user();
        let facts = EventFacts {
            visibility: EventVisibility::Private,
            club: ClubFacts::new(creator.user_id, None),
        };
        assert!(facts.evaluate(&creator, EventAction::View).is_permit());
        assert!(!facts.evaluate(&user(), EventAction::View).is_permit());
        assert!(event(EventVisibility::Private, Some(MembershipStatus::Active))
            .evaluate(&user(), EventAction::View)
            .is_permit());
        assert!(event(EventVisibility::MembersOnly, None)
            .evaluate(&user(), EventAction::View)
            .is_permit());
    }

    #[test]
    fn active_members_cannot_check_in_others() {
        let facts = event(EventVisibility::Open, Some(MembershipStatus::Active));
        assert!(!facts.evaluate(&user(), EventAction::CheckInOther).is_permit());
        assert!(facts.evaluate(&user(), EventAction::ViewParticipants).is_permit());
        assert!(facts.evaluate(&admin(), EventAction::CheckInOther).is_permit());
    }
}
