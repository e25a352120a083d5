pub mod club;
pub mod court;
pub mod event;
pub mod matches;
pub mod membership;
pub mod user;

pub use club::{Club, ClubChanges, ClubFilter, NewClub};
pub use court::{Court, CourtChanges, CourtDeletion, NewCourt};
pub use event::{
    CheckInOutcome, Event, EventChanges, EventFilter, EventParticipant, NewEvent, ParticipantView,
};
pub use matches::{
    Match, MatchChanges, MatchDetail, MatchFilter, MatchKind, MatchParticipant,
    MatchParticipantView, MatchStats, NewMatch, ParticipantInput,
};
pub use membership::{MemberView, Membership, MembershipChanges, NewMembership};
pub use user::{NewUser, User, UserChanges, UserFilter, UserSummary};
