//! Shared primitive types used across the ledger.

/// Identity of a registered user.
pub type UserId = String;

/// Identity of a station (friend group).
pub type StationId = String;

/// Identity of one completed game round.
pub type SessionId = String;

/// A signed dopamine amount. Positive is gained, negative is lost.
pub type Dopamine = i64;
