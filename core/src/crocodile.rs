//! Crocodile teeth: a turn-based elimination game.
//!
//! N teeth, one of them is a trap. Players take turns pressing teeth in
//! round-robin order; whoever presses the trap loses the round.
//!
//! States are immutable and shared behind `Arc`. A press that changes
//! nothing (game already over, tooth already pressed) hands back the
//! very same `Arc`, so callers can test `Arc::ptr_eq` instead of
//! comparing whole states.

use crate::{
    member::GameOutcome,
    rng::{SecureDraw, SlotDraw},
    types::UserId,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, sync::Arc};

pub const DEFAULT_SLOT_COUNT: u32 = 12;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrocodilePlayer {
    pub user_id:  UserId,
    pub nickname: String,
}

impl CrocodilePlayer {
    pub fn new(user_id: impl Into<UserId>, nickname: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), nickname: nickname.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrocodileGameState {
    pub slot_count:           u32,
    pub trap_index:           u32,
    pub pressed_slots:        BTreeSet<u32>,
    pub current_player_index: usize,
    pub players:              Vec<CrocodilePlayer>,
    /// Set once the trap is pressed. Terminal from then on.
    pub loser_id:             Option<UserId>,
}

impl CrocodileGameState {
    pub fn is_over(&self) -> bool {
        self.loser_id.is_some()
    }

    /// Whose turn it is. `None` only for an empty roster.
    pub fn current_player(&self) -> Option<&CrocodilePlayer> {
        self.players.get(self.current_player_index)
    }

    pub fn loser(&self) -> Option<&CrocodilePlayer> {
        let loser_id = self.loser_id.as_deref()?;
        self.players.iter().find(|p| p.user_id == loser_id)
    }

    /// Teeth in `[0, slot_count)` not yet pressed.
    pub fn remaining_slots(&self) -> Vec<u32> {
        (0..self.slot_count)
            .filter(|s| !self.pressed_slots.contains(s))
            .collect()
    }

    /// Per-player results once the round is over: the loser loses,
    /// everyone else wins. `None` while the game is in progress.
    pub fn outcomes(&self) -> Option<Vec<(UserId, GameOutcome)>> {
        let loser_id = self.loser_id.as_deref()?;
        Some(
            self.players
                .iter()
                .map(|p| {
                    let outcome = if p.user_id == loser_id {
                        GameOutcome::Lose
                    } else {
                        GameOutcome::Win
                    };
                    (p.user_id.clone(), outcome)
                })
                .collect(),
        )
    }
}

/// Start a round. The trap is drawn from OS entropy unless `trap_index`
/// is given. An explicit `trap_index` is trusted as-is.
pub fn initialize(
    players:    Vec<CrocodilePlayer>,
    slot_count: u32,
    trap_index: Option<u32>,
) -> Arc<CrocodileGameState> {
    match trap_index {
        Some(trap) => build(players, slot_count, trap),
        None => initialize_with(players, slot_count, &mut SecureDraw::new()),
    }
}

/// Start a round with the trap drawn from `draw`.
pub fn initialize_with<D: SlotDraw + ?Sized>(
    players:    Vec<CrocodilePlayer>,
    slot_count: u32,
    draw:       &mut D,
) -> Arc<CrocodileGameState> {
    let trap = draw.draw_below(slot_count);
    build(players, slot_count, trap)
}

fn build(players: Vec<CrocodilePlayer>, slot_count: u32, trap_index: u32) -> Arc<CrocodileGameState> {
    Arc::new(CrocodileGameState {
        slot_count,
        trap_index,
        pressed_slots: BTreeSet::new(),
        current_player_index: 0,
        players,
        loser_id: None,
    })
}

/// Press one tooth on behalf of the current player.
///
/// Out-of-range teeth never match the trap and count as a safe press.
pub fn press_slot(state: &Arc<CrocodileGameState>, slot: u32) -> Arc<CrocodileGameState> {
    if state.is_over() || state.pressed_slots.contains(&slot) || state.players.is_empty() {
        return Arc::clone(state);
    }

    let mut next = CrocodileGameState::clone(state);
    next.pressed_slots.insert(slot);

    if slot == state.trap_index {
        let loser = &state.players[state.current_player_index];
        log::debug!("crocodile: {} pressed the trap tooth {slot}", loser.user_id);
        next.loser_id = Some(loser.user_id.clone());
    } else {
        next.current_player_index = (state.current_player_index + 1) % state.players.len();
    }
    Arc::new(next)
}

pub fn is_over(state: &CrocodileGameState) -> bool {
    state.is_over()
}
