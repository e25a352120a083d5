use uuid::Uuid;

use super::{can_manage_club, Actor, ClubFacts, Decision, Policy};

/// Facts about a recorded match. `club` is set for club matches only.
#[derive(Debug, Clone)]
pub struct MatchFacts {
    pub creator_id: Uuid,
    pub club: Option<ClubFacts>,
    pub participant_ids: Vec<Uuid>,
}

impl MatchFacts {
    pub fn is_participant(&self, actor: &Actor) -> bool {
        self.participant_ids.contains(&actor.user_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchAction {
    View,
    Update,
    Delete,
}

impl Policy for MatchFacts {
    type Action = MatchAction;

    fn evaluate(&self, actor: &Actor, action: MatchAction) -> Decision {
        match (&self.club, action) {
            (Some(club), MatchAction::View) => Decision::from_bool(
                club.is_insider(actor) || self.is_participant(actor),
                "only club members and participants can view this match",
            ),
            (Some(club), MatchAction::Update | MatchAction::Delete) => Decision::from_bool(
                can_manage_club(actor, club.creator_id),
                "only the club creator can modify club matches",
            ),
            (None, MatchAction::View) => Decision::from_bool(
                actor.is_super_admin()
                    || actor.user_id == self.creator_id
                    || self.is_participant(actor),
                "only the creator and participants can view this match",
            ),
            // Participants see informal matches but only the creator edits them
            (None, MatchAction::Update | MatchAction::Delete) => Decision::from_bool(
                actor.is_super_admin() || actor.user_id == self.creator_id,
                "only the match creator can modify this match",
            ),
        }
    }
}
