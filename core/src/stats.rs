//! Balance aggregation for one station.
//!
//! Folds game results and manual transfers into per-member statistics.
//! Pure: no I/O, no errors, output order follows the member list.

use crate::{
    member::{GameOutcome, GameResultRecord, ManualTransfer, Member, MemberRole},
    types::{Dopamine, UserId},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Nickname shown for members whose user profile is missing.
pub const UNKNOWN_NICKNAME: &str = "Unknown";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberStats {
    pub user_id:        UserId,
    pub nickname:       String,
    pub avatar_url:     Option<String>,
    pub role:           MemberRole,
    pub wins:           u32,
    pub losses:         u32,
    pub game_balance:   Dopamine,
    pub manual_balance: Dopamine,
    pub total_balance:  Dopamine,
}

#[derive(Debug, Clone, Copy, Default)]
struct GameTally {
    wins:    u32,
    losses:  u32,
    balance: Dopamine,
}

/// Compute one `MemberStats` per member, in member order.
///
/// Rows referencing users outside `members` are grouped but never
/// surface in the output. Sums saturate at the `i64` bounds.
pub fn compute_stats(
    members:      &[Member],
    game_results: &[GameResultRecord],
    transfers:    &[ManualTransfer],
) -> Vec<MemberStats> {
    let mut games: HashMap<&str, GameTally> = HashMap::new();
    for row in game_results {
        let tally = games.entry(row.user_id.as_str()).or_default();
        match row.result {
            Some(GameOutcome::Win)  => tally.wins += 1,
            Some(GameOutcome::Lose) => tally.losses += 1,
            None => {}
        }
        tally.balance = tally.balance.saturating_add(row.dopamine_change);
    }

    let mut manual: HashMap<&str, Dopamine> = HashMap::new();
    for t in transfers {
        let to = manual.entry(t.to_user.as_str()).or_insert(0);
        *to = to.saturating_add(t.amount);
        let from = manual.entry(t.from_user.as_str()).or_insert(0);
        *from = from.saturating_sub(t.amount);
    }

    members
        .iter()
        .map(|member| {
            let game = games.get(member.user_id.as_str()).copied().unwrap_or_default();
            let manual_balance = manual.get(member.user_id.as_str()).copied().unwrap_or(0);
            let (nickname, avatar_url) = match &member.profile {
                Some(p) => (p.nickname.clone(), p.avatar_url.clone()),
                None    => (UNKNOWN_NICKNAME.to_string(), None),
            };
            MemberStats {
                user_id: member.user_id.clone(),
                nickname,
                avatar_url,
                role: member.role,
                wins: game.wins,
                losses: game.losses,
                game_balance: game.balance,
                manual_balance,
                total_balance: game.balance.saturating_add(manual_balance),
            }
        })
        .collect()
}

/// Dashboard ordering: highest total first. Ties keep member order.
pub fn rank_by_total(mut stats: Vec<MemberStats>) -> Vec<MemberStats> {
    stats.sort_by(|a, b| b.total_balance.cmp(&a.total_balance));
    stats
}
