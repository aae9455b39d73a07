use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Amount must be greater than zero, got {amount}")]
    InvalidAmount { amount: i64 },

    #[error("Cannot transfer dopamine to yourself")]
    SelfTransfer,

    #[error("User '{user_id}' is not a member of station '{station_id}'")]
    NotAMember { station_id: String, user_id: String },

    #[error("A game needs at least one winner and one loser")]
    MissingOutcome,

    #[error("At least {required} participants are required, got {actual}")]
    TooFewParticipants { required: usize, actual: usize },

    #[error("Game type '{slug}' not found")]
    UnknownGameType { slug: String },

    #[error("Invalid invite code '{code}'")]
    InvalidInviteCode { code: String },

    #[error("Station '{station_id}' not found")]
    StationNotFound { station_id: String },

    #[error("User '{user_id}' not found")]
    UserNotFound { user_id: String },

    #[error("Game is still in progress")]
    GameNotOver,

    #[error("Station title must not be empty")]
    EmptyTitle,

    #[error("User '{user_id}' appears more than once in one game")]
    DuplicateParticipant { user_id: String },

    #[error("Game type '{slug}' needs at least one slot")]
    InvalidSlotCount { slug: String },

    #[error("Payout for bet {bet} does not fit in a dopamine balance")]
    PayoutOverflow { bet: i64 },

    #[error("Only the owner may do this in station '{station_id}'")]
    NotOwner { station_id: String, user_id: String },

    #[error("The owner cannot leave station '{station_id}'; delete it instead")]
    OwnerCannotLeave { station_id: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
