use chrono::{DateTime, Duration, Utc};

use super::{GuardError, GuardResult};
use crate::database::models::{Event, EventParticipant};
use crate::types::EventStatus;

/// Participants may leave only more than this many minutes before start
pub const LEAVE_CUTOFF_MINUTES: i64 = 120;

/// Check-in opens this many minutes before start
pub const CHECK_IN_OPENS_MINUTES: i64 = 30;

impl EventStatus {
    /// Explicit state machine: SCHEDULED -> ONGOING -> COMPLETED, CANCELLED from
    /// SCHEDULED or ONGOING. Staying in the same state is always allowed.
    pub fn can_transition_to(self, next: EventStatus) -> bool {
        use EventStatus::*;
        self == next
            || matches!(
                (self, next),
                (Scheduled, Ongoing) | (Scheduled, Cancelled) | (Ongoing, Completed) | (Ongoing, Cancelled)
            )
    }

    pub fn is_finished(self) -> bool {
        matches!(self, EventStatus::Completed | EventStatus::Cancelled)
    }
}

pub fn transition(from: EventStatus, to: EventStatus) -> GuardResult<EventStatus> {
    if from.can_transition_to(to) {
        Ok(to)
    } else {
        Err(GuardError::conflict(format!(
            "Cannot change event status from {:?} to {:?}",
            from, to
        )))
    }
}

/// Status after a successful check-in; the first check-in starts the event
pub fn status_after_check_in(current: EventStatus) -> EventStatus {
    match current {
        EventStatus::Scheduled => EventStatus::Ongoing,
        other => other,
    }
}

pub fn validate_schedule(start: DateTime<Utc>, end: DateTime<Utc>) -> GuardResult {
    if end <= start {
        return Err(GuardError::validation(
            "endDateTime",
            "End date must be after start date",
        ));
    }
    Ok(())
}

pub fn validate_future_start(start: DateTime<Utc>, now: DateTime<Utc>) -> GuardResult {
    if start <= now {
        return Err(GuardError::validation(
            "startDateTime",
            "Start date must be in the future",
        ));
    }
    Ok(())
}

/// Registration rules checked before the atomic insert. `participant_count`
/// is advisory here; the store rechecks capacity under its lock.
pub fn can_join(
    event: &Event,
    already_registered: bool,
    participant_count: i64,
    now: DateTime<Utc>,
) -> GuardResult {
    if event.status.is_finished() {
        return Err(GuardError::conflict("Cannot join a completed or cancelled event"));
    }
    if event.status == EventStatus::Ongoing {
        return Err(GuardError::conflict("Cannot join an event that is already in progress"));
    }
    if already_registered {
        return Err(GuardError::conflict("You are already registered for this event"));
    }
    if let Some(capacity) = event.max_participants {
        if participant_count >= capacity as i64 {
            return Err(GuardError::conflict_with(
                "Event is full",
                serde_json::json!({
                    "maxParticipants": capacity,
                    "currentParticipants": participant_count,
                }),
            ));
        }
    }
    if event.start_date_time <= now {
        return Err(GuardError::conflict("Cannot join an event that has already started"));
    }
    if event.is_priced() {
        return Err(GuardError::Unsupported(
            "Paid events are not yet supported".to_string(),
        ));
    }
    Ok(())
}

pub fn can_leave(event: &Event, now: DateTime<Utc>) -> GuardResult {
    if event.status != EventStatus::Scheduled {
        return Err(GuardError::conflict(
            "Cannot leave an event that is in progress, completed or cancelled",
        ));
    }
    let cutoff = event.start_date_time - Duration::minutes(LEAVE_CUTOFF_MINUTES);
    if now >= cutoff {
        return Err(GuardError::conflict_with(
            "Cannot leave an event less than 2 hours before it starts",
            serde_json::json!({ "leaveDeadline": cutoff }),
        ));
    }
    Ok(())
}

pub fn can_check_in(
    event: &Event,
    participant: &EventParticipant,
    now: DateTime<Utc>,
) -> GuardResult {
    if event.status.is_finished() {
        return Err(GuardError::conflict(
            "Cannot check in to a completed or cancelled event",
        ));
    }
    let opens_at = event.start_date_time - Duration::minutes(CHECK_IN_OPENS_MINUTES);
    if now < opens_at {
        return Err(GuardError::conflict_with(
            "Check-in opens 30 minutes before the event starts",
            serde_json::json!({ "checkInOpensAt": opens_at }),
        ));
    }
    if now > event.end_date_time {
        return Err(GuardError::conflict("Event has already ended"));
    }
    if participant.checked_in {
        return Err(GuardError::conflict("Participant is already checked in"));
    }
    Ok(())
}

pub fn can_undo_check_in(event: &Event, participant: &EventParticipant) -> GuardResult {
    if event.status == EventStatus::Completed {
        return Err(GuardError::conflict(
            "Cannot undo check-in for a completed event",
        ));
    }
    if !participant.checked_in {
        return Err(GuardError::conflict("Participant is not checked in"));
    }
    Ok(())
}

pub fn can_delete(event: &Event) -> GuardResult {
    match event.status {
        EventStatus::Ongoing | EventStatus::Completed => Err(GuardError::conflict(
            "Cannot delete an event that is ongoing or completed",
        )),
        EventStatus::Scheduled | EventStatus::Cancelled => Ok(()),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::{EventType, EventVisibility};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    pub fn event_at(start: DateTime<Utc>, status: EventStatus) -> Event {
        Event {
            id: Uuid::new_v4(),
            club_id: Uuid::new_v4(),
            court_id: None,
            title: "Friday social".to_string(),
            description: None,
            event_type: EventType::Social,
            visibility: EventVisibility::Open,
            status,
            start_date_time: start,
            end_date_time: start + Duration::hours(2),
            max_participants: None,
            price: None,
            created_at: start - Duration::days(7),
            updated_at: start - Duration::days(7),
        }
    }

    fn participant(event: &Event, checked_in: bool) -> EventParticipant {
        EventParticipant {
            id: Uuid::new_v4(),
            event_id: event.id,
            user_id: Uuid::new_v4(),
            checked_in,
            check_in_time: None,
            joined_at: event.created_at,
        }
    }

    #[test]
    fn join_requires_future_start() {
        let now = Utc::now();
        let soon = event_at(now + Duration::minutes(10), EventStatus::Scheduled);
        let started = event_at(now - Duration::minutes(10), EventStatus::Scheduled);

        assert!(can_join(&soon, false, 0, now).is_ok());
        assert!(matches!(can_join(&started, false, 0, now), Err(GuardError::Conflict { .. })));
    }

    #[test]
    fn join_rejects_full_registered_and_priced() {
        let now = Utc::now();
        let mut event = event_at(now + Duration::days(1), EventStatus::Scheduled);
        event.max_participants = Some(2);

        assert!(can_join(&event, false, 1, now).is_ok());
        assert!(matches!(can_join(&event, false, 2, now), Err(GuardError::Conflict { .. })));
        assert!(matches!(can_join(&event, true, 0, now), Err(GuardError::Conflict { .. })));

        event.price = Some(Decimal::new(1500, 2));
        assert!(matches!(can_join(&event, false, 0, now), Err(GuardError::Unsupported(_))));

        event.price = Some(Decimal::ZERO);
        assert!(can_join(&event, false, 0, now).is_ok());
    }

    #[test]
    fn join_only_while_scheduled() {
        let now = Utc::now();
        for status in [EventStatus::Ongoing, EventStatus::Completed, EventStatus::Cancelled] {
            let event = event_at(now + Duration::days(1), status);
            assert!(can_join(&event, false, 0, now).is_err(), "{:?}", status);
        }
    }

    #[test]
    fn leave_window_closes_two_hours_before_start() {
        let now = Utc::now();
        let far = event_at(now + Duration::minutes(121), EventStatus::Scheduled);
        let edge = event_at(now + Duration::minutes(120), EventStatus::Scheduled);
        let ongoing = event_at(now + Duration::days(1), EventStatus::Ongoing);

        assert!(can_leave(&far, now).is_ok());
        assert!(can_leave(&edge, now).is_err());
        assert!(can_leave(&ongoing, now).is_err());
    }

    #[test]
    fn check_in_window() {
        let now = Utc::now();
        let early = event_at(now + Duration::minutes(31), EventStatus::Scheduled);
        let open = event_at(now + Duration::minutes(30), EventStatus::Scheduled);
        let ended = event_at(now - Duration::hours(3), EventStatus::Ongoing);
        let cancelled = event_at(now, EventStatus::Cancelled);

        assert!(can_check_in(&early, &participant(&early, false), now).is_err());
        assert!(can_check_in(&open, &participant(&open, false), now).is_ok());
        assert!(can_check_in(&open, &participant(&open, true), now).is_err());
        assert!(can_check_in(&ended, &participant(&ended, false), now).is_err());
        assert!(can_check_in(&cancelled, &participant(&cancelled, false), now).is_err());
    }

    #[test]
    fn first_check_in_starts_the_event() {
        assert_eq!(status_after_check_in(EventStatus::Scheduled), EventStatus::Ongoing);
        assert_eq!(status_after_check_in(EventStatus::Ongoing), EventStatus::Ongoing);
    }

    #[test]
    fn undo_check_in_rules() {
        let now = Utc::now();
        let ongoing = event_at(now, EventStatus::Ongoing);
        let completed = event_at(now, EventStatus::Completed);

        assert!(can_undo_check_in(&ongoing, &participant(&ongoing, true)).is_ok());
        assert!(can_undo_check_in(&ongoing, &participant(&ongoing, false)).is_err());
        assert!(can_undo_check_in(&completed, &participant(&completed, true)).is_err());
    }

    #[test]
    fn delete_blocked_once_started() {
        let now = Utc::now();
        assert!(can_delete(&event_at(now, EventStatus::Scheduled)).is_ok());
        assert!(can_delete(&event_at(now, EventStatus::Cancelled)).is_ok());
        assert!(can_delete(&event_at(now, EventStatus::Ongoing)).is_err());
        assert!(can_delete(&event_at(now, EventStatus::Completed)).is_err());
    }

    #[test]
    fn status_machine() {
        use EventStatus::*;
        assert!(transition(Scheduled, Ongoing).is_ok());
        assert!(transition(Scheduled, Cancelled).is_ok());
        assert!(transition(Ongoing, Completed).is_ok());
        assert!(transition(Ongoing, Cancelled).is_ok());
        assert!(transition(Completed, Completed).is_ok());
        assert!(transition(Scheduled, Completed).is_err());
        assert!(transition(Completed, Ongoing).is_err());
        assert!(transition(Cancelled, Scheduled).is_err());
    }

    #[test]
    fn schedule_ordering() {
        let now = Utc::now();
        assert!(validate_schedule(now, now + Duration::minutes(1)).is_ok());
        assert!(validate_schedule(now, now).is_err());
        assert!(validate_future_start(now - Duration::seconds(1), now).is_err());
    }
}
