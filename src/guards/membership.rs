use uuid::Uuid;

use super::{GuardError, GuardResult};
use crate::database::models::Membership;
use crate::types::MembershipStatus;

pub fn can_add(existing: Option<&Membership>) -> GuardResult {
    match existing {
        Some(membership) => Err(GuardError::conflict_with(
            "User is already a member of this club",
            serde_json::json!({ "status": membership.status }),
        )),
        None => Ok(()),
    }
}

/// New memberships start ACTIVE or PENDING
pub fn validate_initial_status(status: MembershipStatus) -> GuardResult {
    match status {
        MembershipStatus::Active | MembershipStatus::Pending => Ok(()),
        MembershipStatus::Inactive | MembershipStatus::Cancelled => Err(GuardError::validation(
            "status",
            "New memberships must be ACTIVE or PENDING",
        )),
    }
}

/// Any status may follow any other
pub fn transition(_from: MembershipStatus, to: MembershipStatus) -> GuardResult<MembershipStatus> {
    Ok(to)
}

pub fn can_remove(club_creator_id: Uuid, member_user_id: Uuid) -> GuardResult {
    if club_creator_id == member_user_id {
        return Err(GuardError::conflict(
            "Cannot remove the club creator from the club",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn duplicate_membership_conflicts() {
        let existing = Membership {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            club_id: Uuid::new_v4(),
            status: MembershipStatus::Pending,
            expires_at: None,
            joined_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(can_add(None).is_ok());
        assert!(matches!(can_add(Some(&existing)), Err(GuardError::Conflict { .. })));
    }

    #[test]
    fn creator_is_never_removable() {
        let creator = Uuid::new_v4();
        assert!(can_remove(creator, creator).is_err());
        assert!(can_remove(creator, Uuid::new_v4()).is_ok());
    }

    #[test]
    fn status_transitions_are_unrestricted() {
        use MembershipStatus::*;
        for from in [Active, Inactive, Pending, Cancelled] {
            for to in [Active, Inactive, Pending, Cancelled] {
                assert_eq!(transition(from, to).unwrap(), to);
            }
        }
    }

    #[test]
    fn initial_status_active_or_pending() {
        assert!(validate_initial_status(MembershipStatus::Pending).is_ok());
        assert!(validate_initial_status(MembershipStatus::Active).is_ok());
        assert!(validate_initial_status(MembershipStatus::Cancelled).is_err());
    }
}
