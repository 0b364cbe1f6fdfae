use thiserror::Error;

use crate::store::StoreError;

/// Coarse classification used by callers to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    Conflict,
    StateViolation,
    Infrastructure,
}

#[derive(Error, Debug)]
pub enum BookingError {
    // Missing or filtered out by status
    #[error("Branch not found")]
    BranchNotFound,
    #[error("Branch not found or inactive")]
    BranchInactive,
    #[error("Room not found")]
    RoomNotFound,
    #[error("Team not found")]
    TeamNotFound,
    #[error("User not found")]
    UserNotFound,

    #[error("Date must be in yyyy-MM-dd format")]
    InvalidDate,
    #[error("{field} must be in HH:mm format (e.g., 09:00)")]
    InvalidTime { field: &'static str },
    #[error("End time must be after start time")]
    InvalidTimeRange,
    #[error("Cannot create a room in the past")]
    BookingInPast,
    #[error("Booking time must be within branch operating hours ({start} - {end})")]
    OutsideOperatingHours { start: String, end: String },
    #[error("Operating hours end must be after operating hours start")]
    InvalidOperatingHours,
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
    #[error("Invalid search type: {0}")]
    InvalidSearchType(String),
    #[error("Total slots must be at least 2")]
    InvalidTotalSlots,
    #[error("Roster size must be at least 2")]
    InvalidRosterSize,
    #[error("{0} must not be blank")]
    InvalidName(&'static str),

    #[error("You have a conflicting booking at this time")]
    TimeConflict,
    #[error("Your team has a conflicting team room booking at this time")]
    TeamConflict,
    #[error("One or more team members have conflicting individual room bookings at this time")]
    TeamMembersConflict,

    #[error("Room is already full")]
    RoomFull,
    #[error("You have already joined this room")]
    AlreadyJoined,
    #[error("You are not a participant in this room")]
    NotParticipant,
    #[error("Room owner cannot leave the room. Please cancel the room instead.")]
    OwnerCannotLeave,
    #[error("Only the room owner can cancel the room")]
    NotOwner,
    #[error("Only the team captain can perform this action")]
    NotCaptain,
    #[error("User is already a member of this team")]
    AlreadyMember,
    #[error("Team is already at full capacity")]
    TeamFull,
    #[error("Cannot remove the team captain. Transfer captain role first or disband the team.")]
    CannotRemoveCaptain,
    #[error("User is not a member of this team")]
    NotTeamMember,
    #[error("You are already the captain")]
    AlreadyCaptain,
    #[error("New captain must be a member of the team")]
    NewCaptainNotMember,
    #[error("Room is already matched")]
    RoomAlreadyMatched,
    #[error("Cannot join your own team's room")]
    CannotJoinOwnRoom,
    #[error("Team size mismatch. Required: {required} players")]
    TeamSizeMismatch { required: i32 },
    #[error("Team must have full roster to perform this action ({roster_size} players)")]
    TeamNotFullRoster { roster_size: i32 },
    #[error("Only the creator team's captain can cancel the room")]
    NotCreatorCaptain,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BookingError {
    pub fn kind(&self) -> ErrorKind {
        use BookingError::*;

        match self {
            BranchNotFound | BranchInactive | RoomNotFound | TeamNotFound | UserNotFound => {
                ErrorKind::NotFound
            }
            InvalidDate
            | InvalidTime { .. }
            | InvalidTimeRange
            | BookingInPast
            | OutsideOperatingHours { .. }
            | InvalidOperatingHours
            | InvalidStatus(_)
            | InvalidSearchType(_)
            | InvalidTotalSlots
            | InvalidRosterSize
            | InvalidName(_) => ErrorKind::InvalidInput,
            TimeConflict | TeamConflict | TeamMembersConflict => ErrorKind::Conflict,
            RoomFull
            | AlreadyJoined
            | NotParticipant
            | OwnerCannotLeave
            | NotOwner
            | NotCaptain
            | AlreadyMember
            | TeamFull
            | CannotRemoveCaptain
            | NotTeamMember
            | AlreadyCaptain
            | NewCaptainNotMember
            | RoomAlreadyMatched
            | CannotJoinOwnRoom
            | TeamSizeMismatch { .. }
            | TeamNotFullRoster { .. }
            | NotCreatorCaptain => ErrorKind::StateViolation,
            Store(_) => ErrorKind::Infrastructure,
        }
    }
}

impl From<sqlx::Error> for BookingError {
    fn from(error: sqlx::Error) -> Self {
        BookingError::Store(StoreError::Database(error))
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
