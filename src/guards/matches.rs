use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::{GuardError, GuardResult};
use crate::database::models::{Court, ParticipantInput};
use crate::types::MatchType;

const MAX_SETS: usize = 5;

pub const SCORE_FORMAT_MESSAGE: &str =
    "Invalid score format. Use: '21-19' or '21-19,19-21' (1-5 sets)";

/// 1 to 5 comma-separated `N-N` sets, each N one or two digits
pub fn is_valid_score(score: &str) -> bool {
    let sets: Vec<&str> = score.split(',').collect();
    if sets.is_empty() || sets.len() > MAX_SETS {
        return false;
    }
    sets.iter().all(|set| match set.split_once('-') {
        Some((left, right)) => is_points(left) && is_points(right),
        None => false,
    })
}

fn is_points(s: &str) -> bool {
    (1..=2).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

pub fn validate_score(score: Option<&str>) -> GuardResult {
    match score {
        Some(score) if !is_valid_score(score) => {
            Err(GuardError::validation("score", SCORE_FORMAT_MESSAGE))
        }
        _ => Ok(()),
    }
}

pub fn validate_times(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> GuardResult {
    match (start, end) {
        (None, Some(_)) => Err(GuardError::validation(
            "startTime",
            "Start time is required when end time is set",
        )),
        (Some(start), Some(end)) if end <= start => Err(GuardError::validation(
            "endTime",
            "End time must be after start time",
        )),
        _ => Ok(()),
    }
}

/// Roster shape rules. Existence and membership of the users are checked by the caller.
pub fn validate_participants(match_type: MatchType, participants: &[ParticipantInput]) -> GuardResult {
    if participants.is_empty() {
        return Err(GuardError::validation(
            "participants",
            "At least one participant is required",
        ));
    }

    let max = match_type.max_participants();
    if participants.len() > max {
        return Err(GuardError::validation(
            "participants",
            format!("{:?} matches allow at most {} participants", match_type, max),
        ));
    }

    let mut seen = HashSet::new();
    for p in participants {
        if !seen.insert(p.user_id) {
            return Err(GuardError::validation(
                "participants",
                "Duplicate participants are not allowed",
            ));
        }
        if !(1..=2).contains(&p.team) {
            return Err(GuardError::validation("team", "Team must be 1 or 2"));
        }
    }

    Ok(())
}

/// Court rules: always active; for club matches it must also belong to the club
pub fn validate_court(court: &Court, club_id: Option<uuid::Uuid>) -> GuardResult {
    if let Some(club_id) = club_id {
        if court.club_id != club_id {
            return Err(GuardError::validation(
                "courtId",
                "Court does not belong to this club",
            ));
        }
    }
    if !court.is_active {
        return Err(GuardError::validation("courtId", "Court is not active"));
    }
    Ok(())
}
