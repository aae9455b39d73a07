//! Turns a finished round into game-result rows.
//!
//! Every loser pays the full bet. The pot (bet × losers) is split evenly
//! among the winners, rounded down; the remainder is not paid out. A pot
//! that does not fit in an `i64` is refused.

use crate::{
    error::{LedgerError, LedgerResult},
    member::{GameOutcome, GameResultRecord},
    types::{Dopamine, UserId},
};

pub fn settle(
    bet:          Dopamine,
    participants: &[(UserId, GameOutcome)],
) -> LedgerResult<Vec<GameResultRecord>> {
    if bet <= 0 {
        return Err(LedgerError::InvalidAmount { amount: bet });
    }

    let losers = participants.iter().filter(|(_, o)| *o == GameOutcome::Lose).count() as i64;
    let winners = participants.len() as i64 - losers;
    if losers == 0 || winners == 0 {
        return Err(LedgerError::MissingOutcome);
    }

    let pot = bet
        .checked_mul(losers)
        .ok_or(LedgerError::PayoutOverflow { bet })?;
    let win_share = pot / winners;

    Ok(participants
        .iter()
        .map(|(user_id, outcome)| GameResultRecord {
            user_id: user_id.clone(),
            result: Some(*outcome),
            dopamine_change: match outcome {
                GameOutcome::Lose => -bet,
                GameOutcome::Win  => win_share,
            },
        })
        .collect())
}
