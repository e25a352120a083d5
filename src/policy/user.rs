use uuid::Uuid;

use super::{Actor, Decision, Policy};

#[derive(Debug, Clone, Copy)]
pub struct UserFacts {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    View,
    Delete,
    ViewMatches,
}

impl Policy for UserFacts {
    type Action = UserAction;

    fn evaluate(&self, actor: &Actor, action: UserAction) -> Decision {
        match action {
            UserAction::View => {
                Decision::from_bool(actor.is_super_admin(), "super admin access required")
            }
            UserAction::Delete if !actor.is_super_admin() => {
                Decision::Deny("super admin access required".to_string())
            }
            UserAction::Delete => Decision::from_bool(
                actor.user_id != self.user_id,
                "cannot delete your own account",
            ),
            UserAction::ViewMatches => Decision::from_bool(
                actor.is_super_admin() || actor.user_id == self.user_id,
                "you can only view your own matches",
            ),
        }
    }
}
