use serde_json::json;

use super::{GuardError, GuardResult};

pub fn can_deactivate(future_events: i64) -> GuardResult {
    if future_events > 0 {
        return Err(GuardError::conflict_with(
            "Cannot deactivate court with scheduled or ongoing events",
            json!({
                "futureEvents": future_events,
                "suggestion": "Cancel or move the events to another court first",
            }),
        ));
    }
    Ok(())
}

pub fn can_delete(future_events: i64, incomplete_matches: i64) -> GuardResult {
    if future_events > 0 {
        return Err(GuardError::conflict_with(
            "Cannot delete court with scheduled or ongoing events",
            json!({
                "futureEvents": future_events,
                "suggestion": "Cancel the events or deactivate the court instead",
            }),
        ));
    }
    if incomplete_matches > 0 {
        return Err(GuardError::conflict_with(
            "Cannot delete court with incomplete matches",
            json!({
                "incompleteMatches": incomplete_matches,
                "suggestion": "Complete or delete the matches first",
            }),
        ));
    }
    Ok(())
}
