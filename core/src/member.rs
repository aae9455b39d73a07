//! Rows the aggregator consumes: members, game results, manual transfers.
//!
//! These are supplied by the store already filtered to one station.
//! Nothing in here is mutated during a stats computation.

use crate::{
    error::{LedgerError, LedgerResult},
    types::{Dopamine, UserId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Owner,
    Member,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner  => "owner",
            Self::Member => "member",
        }
    }

    /// Unknown roles fall back to `Member`.
    pub fn parse(s: &str) -> Self {
        match s {
            "owner" => Self::Owner,
            _       => Self::Member,
        }
    }
}

/// Public profile of a user. May be missing when the user row is gone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub nickname:   String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Member {
    pub user_id: UserId,
    pub role:    MemberRole,
    pub profile: Option<UserProfile>,
}

impl Member {
    pub fn new(user_id: impl Into<UserId>, role: MemberRole, nickname: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            profile: Some(UserProfile {
                nickname:   nickname.into(),
                avatar_url: None,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    Win,
    Lose,
}

impl GameOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Win  => "win",
            Self::Lose => "lose",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "win"  => Some(Self::Win),
            "lose" => Some(Self::Lose),
            _      => None,
        }
    }
}

/// One participant's result in one completed game round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameResultRecord {
    pub user_id:         UserId,
    pub result:          Option<GameOutcome>,
    pub dopamine_change: Dopamine,
}

/// A point transfer: debits `from_user`, credits `to_user`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManualTransfer {
    pub from_user: UserId,
    pub to_user:   UserId,
    pub amount:    Dopamine,
}

impl ManualTransfer {
    /// Build a transfer that is safe to persist.
    /// Rejects non-positive amounts and transfers to oneself.
    pub fn checked(
        from_user: impl Into<UserId>,
        to_user:   impl Into<UserId>,
        amount:    Dopamine,
    ) -> LedgerResult<Self> {
        let from_user = from_user.into();
        let to_user = to_user.into();
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount { amount });
        }
        if from_user == to_user {
            return Err(LedgerError::SelfTransfer);
        }
        Ok(Self { from_user, to_user, amount })
    }
}
