//! Game flow tests: crocodile rounds and random picks, end to end.

use dopamine_core::{
    config::LedgerConfig,
    crocodile::{self, press_slot},
    error::LedgerError,
    ledger::StationLedger,
    member::GameOutcome,
    rng::SeededDraw,
    store::LedgerStore,
};
use std::sync::Arc;

fn build(seed: u64) -> (StationLedger, String, Vec<String>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = LedgerStore::in_memory().expect("in-memory store");
    let ledger = StationLedger::new(store, LedgerConfig::default_test())
        .expect("ledger")
        .with_draw(SeededDraw::new(seed).with_name("games-test"));
    let ids: Vec<String> = ["Alice", "Bob", "Cara"]
        .iter()
        .map(|n| ledger.register_user(n, None).expect("register"))
        .collect();
    let station = ledger.create_station(&ids[0], "Game Night", None).expect("create");
    let code = ledger.invite_code(&station).expect("code");
    for id in &ids[1..] {
        ledger.join_by_invite_code(id, &code).expect("join");
    }
    (ledger, station, ids)
}

/// Press teeth in ascending order until somebody hits the trap.
fn play_out(state: Arc<crocodile::CrocodileGameState>) -> Arc<crocodile::CrocodileGameState> {
    let mut state = state;
    for slot in 0..state.slot_count {
        state = press_slot(&state, slot);
        if state.is_over() {
            break;
        }
    }
    state
}

#[test]
fn crocodile_round_settles_into_balances() {
    let (mut ledger, station, ids) = build(0xC0C0);
    let state = ledger.start_crocodile(&station, &ids).expect("start");
    assert_eq!(state.slot_count, 12);
    assert_eq!(state.players.len(), 3);
    assert_eq!(state.players[1].nickname, "Bob");

    let over = play_out(state);
    let loser = over.loser_id.clone().expect("someone loses");
    ledger
        .complete_crocodile(&station, &ids[0], 1000, &over)
        .expect("complete");

    let stats = ledger.member_stats(&station).expect("stats");
    for s in &stats {
        if s.user_id == loser {
            assert_eq!((s.wins, s.losses), (0, 1));
            assert_eq!(s.game_balance, -1000);
        } else {
            assert_eq!((s.wins, s.losses), (1, 0));
            assert_eq!(s.game_balance, 500);
        }
    }
    assert_eq!(ledger.store().completed_session_count(&station).expect("count"), 1);
}

#[test]
fn same_seed_places_the_same_trap() {
    let (mut a, station_a, ids_a) = build(42);
    let (mut b, station_b, ids_b) = build(42);
    let sa = a.start_crocodile(&station_a, &ids_a).expect("start a");
    let sb = b.start_crocodile(&station_b, &ids_b).expect("start b");
    assert_eq!(sa.trap_index, sb.trap_index);
}

#[test]
fn unfinished_round_cannot_be_recorded() {
    let (mut ledger, station, ids) = build(7);
    let state = ledger.start_crocodile(&station, &ids).expect("start");
    let err = ledger
        .complete_crocodile(&station, &ids[0], 100, &state)
        .expect_err("still playing");
    assert!(matches!(err, LedgerError::GameNotOver));
    assert_eq!(ledger.store().completed_session_count(&station).expect("count"), 0);
}

#[test]
fn rounds_need_enough_members() {
    let (mut ledger, station, ids) = build(7);
    let err = ledger
        .start_crocodile(&station, &ids[..1])
        .expect_err("one player");
    assert!(matches!(err, LedgerError::TooFewParticipants { required: 2, actual: 1 }));

    // duplicates collapse
    let err = ledger
        .start_crocodile(&station, &[ids[0].clone(), ids[0].clone()])
        .expect_err("same player twice");
    assert!(matches!(err, LedgerError::TooFewParticipants { actual: 1, .. }));

    let outsider = ledger.register_user("Eve", None).expect("register");
    let err = ledger
        .start_crocodile(&station, &[ids[0].clone(), outsider])
        .expect_err("outsider");
    assert!(matches!(err, LedgerError::NotAMember { .. }));
}

#[test]
fn random_pick_records_one_loser() {
    let (mut ledger, station, ids) = build(0x5EED);
    let (loser, _session) = ledger
        .play_random_pick(&station, &ids[1], 300, &ids)
        .expect("random pick");
    assert!(ids.contains(&loser));

    let stats = ledger.member_stats(&station).expect("stats");
    let losers: Vec<_> = stats.iter().filter(|s| s.losses == 1).collect();
    assert_eq!(losers.len(), 1);
    assert_eq!(losers[0].user_id, loser);
    assert_eq!(losers[0].game_balance, -300);
    assert_eq!(stats.iter().filter(|s| s.wins == 1).count(), 2);
}

#[test]
fn complete_game_validates_inputs() {
    let (ledger, station, ids) = build(1);
    let everyone_wins: Vec<_> = ids.iter().map(|id| (id.clone(), GameOutcome::Win)).collect();
    assert!(matches!(
        ledger.complete_game(&station, &ids[0], "crocodile", 100, &everyone_wins),
        Err(LedgerError::MissingOutcome)
    ));

    let pair = vec![(ids[0].clone(), GameOutcome::Win), (ids[1].clone(), GameOutcome::Lose)];
    assert!(matches!(
        ledger.complete_game(&station, &ids[0], "poker", 100, &pair),
        Err(LedgerError::UnknownGameType { .. })
    ));
    assert!(matches!(
        ledger.complete_game(&station, &ids[0], "crocodile", 0, &pair),
        Err(LedgerError::InvalidAmount { amount: 0 })
    ));
    assert!(matches!(
        ledger.complete_game(&station, "stranger", "crocodile", 100, &pair),
        Err(LedgerError::NotAMember { .. })
    ));
    assert_eq!(ledger.store().completed_session_count(&station).expect("count"), 0);
}

#[test]
fn a_player_listed_twice_is_rejected() {
    let (ledger, station, ids) = build(2);
    let doubled = vec![
        (ids[0].clone(), GameOutcome::Win),
        (ids[1].clone(), GameOutcome::Lose),
        (ids[1].clone(), GameOutcome::Lose),
    ];
    let err = ledger
        .complete_game(&station, &ids[0], "crocodile", 1000, &doubled)
        .expect_err("Bob listed twice");
    assert!(matches!(err, LedgerError::DuplicateParticipant { ref user_id } if *user_id == ids[1]));
    assert_eq!(ledger.store().completed_session_count(&station).expect("count"), 0);

    let stats = ledger.member_stats(&station).expect("stats");
    assert!(stats.iter().all(|s| s.wins == 0 && s.losses == 0 && s.game_balance == 0));
}

#[test]
fn zero_slot_crocodile_is_an_error() {
    let (mut ledger, station, ids) = build(3);
    ledger.config.game_types[0].slot_count = Some(0);
    let err = ledger.start_crocodile(&station, &ids).expect_err("no teeth");
    assert!(matches!(err, LedgerError::InvalidSlotCount { ref slug } if slug == "crocodile"));
}

#[test]
fn huge_bets_do_not_overflow() {
    let (ledger, station, ids) = build(4);
    let pair = vec![(ids[0].clone(), GameOutcome::Win), (ids[1].clone(), GameOutcome::Lose)];
    for _ in 0..2 {
        ledger
            .complete_game(&station, &ids[0], "crocodile", i64::MAX, &pair)
            .expect("max bet, one loser");
    }
    let stats = ledger.member_stats(&station).expect("stats");
    assert_eq!(stats[0].game_balance, i64::MAX);
    assert_eq!(stats[1].game_balance, i64::MIN);
    assert_eq!(stats[1].losses, 2);

    let two_losers = vec![
        (ids[0].clone(), GameOutcome::Win),
        (ids[1].clone(), GameOutcome::Lose),
        (ids[2].clone(), GameOutcome::Lose),
    ];
    let err = ledger
        .complete_game(&station, &ids[0], "crocodile", i64::MAX, &two_losers)
        .expect_err("pot overflows");
    assert!(matches!(err, LedgerError::PayoutOverflow { .. }));
    assert_eq!(ledger.store().completed_session_count(&station).expect("count"), 2);
}
