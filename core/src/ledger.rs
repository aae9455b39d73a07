//! Station workflows on top of the store.
//!
//! The ledger is the only caller of the store outside tests. It checks
//! membership, loads one station's rows, and hands them to the pure
//! pieces: `compute_stats` for balances, the crocodile engine for play,
//! `settle` for payouts.

use crate::{
    config::LedgerConfig,
    crocodile::{self, CrocodileGameState, CrocodilePlayer},
    error::{LedgerError, LedgerResult},
    member::{GameOutcome, ManualTransfer, Member, MemberRole},
    rng::{pick_index, SecureDraw, SlotDraw},
    settlement::settle,
    stats::{compute_stats, rank_by_total, MemberStats, UNKNOWN_NICKNAME},
    store::{LedgerStore, StationSummary},
    tease::ShareCard,
    types::{Dopamine, SessionId, StationId, UserId},
};
use std::sync::Arc;

pub const CROCODILE_SLUG: &str = "crocodile";
pub const RANDOM_PICK_SLUG: &str = "random-pick";

pub struct StationLedger {
    pub config: LedgerConfig,
    store:      LedgerStore,
    draw:       Box<dyn SlotDraw + Send>,
}

impl StationLedger {
    /// Migrate the store, register the configured game types, and draw
    /// from OS entropy.
    pub fn new(store: LedgerStore, config: LedgerConfig) -> LedgerResult<Self> {
        store.migrate()?;
        store.sync_game_types(&config.game_types)?;
        Ok(Self {
            config,
            store,
            draw: Box::new(SecureDraw::new()),
        })
    }

    /// Replace the draw source (seeded streams for tests and demo runs).
    pub fn with_draw(mut self, draw: impl SlotDraw + Send + 'static) -> Self {
        self.draw = Box::new(draw);
        self
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    // ── Users and stations ────────────────────────────────────────

    pub fn register_user(&self, nickname: &str, avatar_url: Option<&str>) -> LedgerResult<UserId> {
        self.store.insert_user(nickname.trim(), avatar_url)
    }

    pub fn create_station(
        &self,
        owner: &str,
        title: &str,
        description: Option<&str>,
    ) -> LedgerResult<StationId> {
        let title = title.trim();
        if title.is_empty() {
            return Err(LedgerError::EmptyTitle);
        }
        let description = non_blank(description);
        let invite_code = self.new_invite_code();
        let station_id = self
            .store
            .create_station(owner, title, description, &invite_code)?;
        log::info!("station {station_id} created by {owner} ('{title}')");
        Ok(station_id)
    }

    pub fn invite_code(&self, station_id: &str) -> LedgerResult<String> {
        self.store
            .station_invite_code(station_id)?
            .ok_or_else(|| LedgerError::StationNotFound { station_id: station_id.to_string() })
    }

    /// Join by invite code. Joining a station twice is a no-op.
    pub fn join_by_invite_code(&self, user_id: &str, code: &str) -> LedgerResult<StationId> {
        let station_id = self
            .store
            .station_by_invite_code(code.trim())?
            .ok_or_else(|| LedgerError::InvalidInviteCode { code: code.to_string() })?;
        if self.store.add_member(&station_id, user_id, MemberRole::Member)? {
            log::info!("user {user_id} joined station {station_id}");
        }
        Ok(station_id)
    }

    /// Delete a station and everything recorded in it. Owner only.
    pub fn delete_station(&self, actor: &str, station_id: &str) -> LedgerResult<()> {
        self.require_station(station_id)?;
        if self.store.member_role(station_id, actor)? != Some(MemberRole::Owner) {
            return Err(LedgerError::NotOwner {
                station_id: station_id.to_string(),
                user_id:    actor.to_string(),
            });
        }
        self.store.delete_station(station_id)?;
        log::info!("station {station_id} deleted by {actor}");
        Ok(())
    }

    /// Leave a station. The owner has to delete it instead.
    pub fn leave_station(&self, user_id: &str, station_id: &str) -> LedgerResult<()> {
        self.require_station(station_id)?;
        match self.store.member_role(station_id, user_id)? {
            None => Err(LedgerError::NotAMember {
                station_id: station_id.to_string(),
                user_id:    user_id.to_string(),
            }),
            Some(MemberRole::Owner) => Err(LedgerError::OwnerCannotLeave {
                station_id: station_id.to_string(),
            }),
            Some(MemberRole::Member) => {
                self.store.remove_member(station_id, user_id)?;
                log::info!("user {user_id} left station {station_id}");
                Ok(())
            }
        }
    }

    /// Stations the user belongs to, newest first, with member counts.
    pub fn stations_for(&self, user_id: &str) -> LedgerResult<Vec<StationSummary>> {
        self.store.stations_for_user(user_id)
    }

    pub fn station_summary(&self, station_id: &str) -> LedgerResult<StationSummary> {
        self.store
            .station_summary(station_id)?
            .ok_or_else(|| LedgerError::StationNotFound { station_id: station_id.to_string() })
    }

    // ── Balances ──────────────────────────────────────────────────

    pub fn member_stats(&self, station_id: &str) -> LedgerResult<Vec<MemberStats>> {
        self.require_station(station_id)?;
        let members = self.store.members(station_id)?;
        let games = self.store.completed_game_results(station_id)?;
        let transfers = self.store.transfers(station_id)?;
        Ok(compute_stats(&members, &games, &transfers))
    }

    /// Member stats, highest total balance first.
    pub fn leaderboard(&self, station_id: &str) -> LedgerResult<Vec<MemberStats>> {
        Ok(rank_by_total(self.member_stats(station_id)?))
    }

    pub fn share_card(&self, station_id: &str, user_id: &str) -> LedgerResult<ShareCard> {
        let title = self.require_station(station_id)?;
        let stats = self.member_stats(station_id)?;
        let mine = stats
            .iter()
            .find(|s| s.user_id == user_id)
            .ok_or_else(|| LedgerError::UserNotFound { user_id: user_id.to_string() })?;
        Ok(ShareCard::from_stats(title, mine))
    }

    // ── Games ─────────────────────────────────────────────────────

    /// Start a crocodile round for the given members, in turn order.
    pub fn start_crocodile(
        &mut self,
        station_id: &str,
        players:    &[UserId],
    ) -> LedgerResult<Arc<CrocodileGameState>> {
        let roster = self.roster(station_id, players)?;
        let slot_count = self.config.slot_count_for(CROCODILE_SLUG);
        if slot_count == 0 {
            return Err(LedgerError::InvalidSlotCount { slug: CROCODILE_SLUG.to_string() });
        }
        let state = crocodile::initialize_with(roster, slot_count, self.draw.as_mut());
        log::debug!(
            "crocodile round started in {station_id}: {} players, {slot_count} teeth",
            state.players.len()
        );
        Ok(state)
    }

    /// Settle a finished crocodile round and record it.
    pub fn complete_crocodile(
        &self,
        station_id: &str,
        actor:      &str,
        bet:        Dopamine,
        state:      &CrocodileGameState,
    ) -> LedgerResult<SessionId> {
        let outcomes = state.outcomes().ok_or(LedgerError::GameNotOver)?;
        self.complete_game(station_id, actor, CROCODILE_SLUG, bet, &outcomes)
    }

    /// Draw one loser among `participants` and record the round.
    pub fn play_random_pick(
        &mut self,
        station_id:   &str,
        actor:        &str,
        bet:          Dopamine,
        participants: &[UserId],
    ) -> LedgerResult<(UserId, SessionId)> {
        let roster = self.roster(station_id, participants)?;
        if roster.len() < 2 {
            return Err(LedgerError::MissingOutcome);
        }
        let loser_idx = pick_index(roster.len(), self.draw.as_mut());
        let outcomes: Vec<(UserId, GameOutcome)> = roster
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let outcome = if i == loser_idx { GameOutcome::Lose } else { GameOutcome::Win };
                (p.user_id.clone(), outcome)
            })
            .collect();
        let session_id = self.complete_game(station_id, actor, RANDOM_PICK_SLUG, bet, &outcomes)?;
        Ok((roster[loser_idx].user_id.clone(), session_id))
    }

    /// Record a finished round of any game type.
    pub fn complete_game(
        &self,
        station_id: &str,
        actor:      &str,
        slug:       &str,
        bet:        Dopamine,
        outcomes:   &[(UserId, GameOutcome)],
    ) -> LedgerResult<SessionId> {
        self.require_station(station_id)?;
        self.require_member(station_id, actor)?;
        for (i, (user_id, _)) in outcomes.iter().enumerate() {
            if outcomes[..i].iter().any(|(seen, _)| seen == user_id) {
                return Err(LedgerError::DuplicateParticipant { user_id: user_id.clone() });
            }
            self.require_member(station_id, user_id)?;
        }
        let game_type_id = self
            .store
            .game_type_id(slug)?
            .ok_or_else(|| LedgerError::UnknownGameType { slug: slug.to_string() })?;

        let rows = settle(bet, outcomes)?;
        let session_id = self
            .store
            .insert_completed_game(station_id, game_type_id, bet, actor, &rows)?;
        log::info!(
            "game {session_id} ({slug}) completed in {station_id}: bet={bet}, participants={}",
            rows.len()
        );
        Ok(session_id)
    }

    // ── Manual transfers ──────────────────────────────────────────

    pub fn record_transfer(
        &self,
        station_id:  &str,
        from_user:   &str,
        to_user:     &str,
        amount:      Dopamine,
        description: Option<&str>,
    ) -> LedgerResult<String> {
        let transfer = ManualTransfer::checked(from_user, to_user, amount)?;
        self.require_station(station_id)?;
        self.require_member(station_id, from_user)?;
        self.require_member(station_id, to_user)?;
        let entry_id = self
            .store
            .insert_transfer(station_id, &transfer, non_blank(description))?;
        log::info!("transfer {entry_id} in {station_id}: {from_user} -> {to_user} ({amount})");
        Ok(entry_id)
    }

    // ── Helpers ───────────────────────────────────────────────────

    fn require_station(&self, station_id: &str) -> LedgerResult<String> {
        self.store
            .station_title(station_id)?
            .ok_or_else(|| LedgerError::StationNotFound { station_id: station_id.to_string() })
    }

    fn require_member(&self, station_id: &str, user_id: &str) -> LedgerResult<()> {
        if self.store.is_member(station_id, user_id)? {
            Ok(())
        } else {
            Err(LedgerError::NotAMember {
                station_id: station_id.to_string(),
                user_id:    user_id.to_string(),
            })
        }
    }

    /// Resolve participants to players in the given order, dropping
    /// duplicates. Every participant must be a member.
    fn roster(&self, station_id: &str, participants: &[UserId]) -> LedgerResult<Vec<CrocodilePlayer>> {
        self.require_station(station_id)?;
        let members = self.store.members(station_id)?;

        let mut roster: Vec<CrocodilePlayer> = Vec::with_capacity(participants.len());
        for user_id in participants {
            if roster.iter().any(|p| &p.user_id == user_id) {
                continue;
            }
            let member = members.iter().find(|m| &m.user_id == user_id).ok_or_else(|| {
                LedgerError::NotAMember {
                    station_id: station_id.to_string(),
                    user_id:    user_id.clone(),
                }
            })?;
            roster.push(CrocodilePlayer::new(user_id.clone(), display_name(member)));
        }

        if roster.len() < self.config.min_participants {
            return Err(LedgerError::TooFewParticipants {
                required: self.config.min_participants,
                actual:   roster.len(),
            });
        }
        Ok(roster)
    }

    fn new_invite_code(&self) -> String {
        let len = self.config.invite_code_len.clamp(4, 32);
        let mut code = uuid::Uuid::new_v4().simple().to_string();
        code.truncate(len);
        code
    }
}

fn display_name(member: &Member) -> String {
    member
        .profile
        .as_ref()
        .map(|p| p.nickname.clone())
        .unwrap_or_else(|| UNKNOWN_NICKNAME.to_string())
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
