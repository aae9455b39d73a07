//! Dopamine ledger core: station balances and the crocodile mini-game.
//!
//! The two pure pieces are [`stats::compute_stats`] and the
//! [`crocodile`] state machine. Everything else (store, ledger, config)
//! is the surrounding application that feeds them rows and persists
//! their results.

pub mod config;
pub mod crocodile;
pub mod error;
pub mod ledger;
pub mod member;
pub mod rng;
pub mod settlement;
pub mod stats;
pub mod store;
pub mod tease;
pub mod types;
