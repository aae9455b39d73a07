//! station-runner: headless driver for the dopamine ledger.
//!
//! Usage:
//!   station-runner --seed 12345 --players 4 --rounds 10 --bet 1000 --db ledger.db
//!   station-runner --ipc-mode --db ledger.db
//!   station-runner --config ledger.json ...

use anyhow::Result;
use dopamine_core::{
    config::LedgerConfig,
    crocodile::{press_slot, CrocodileGameState},
    ledger::StationLedger,
    rng::{pick_index, SeededDraw},
    stats::MemberStats,
    store::LedgerStore,
    tease::{format_dopamine, tease_emoji, tease_message},
    types::UserId,
};
use std::collections::HashMap;
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    RegisterUser {
        nickname: String,
        #[serde(default)]
        avatar_url: Option<String>,
    },
    CreateStation {
        owner: UserId,
        title: String,
        #[serde(default)]
        description: Option<String>,
    },
    Join {
        user_id: UserId,
        invite_code: String,
    },
    StartCrocodile {
        station_id: String,
        players: Vec<UserId>,
    },
    Press {
        game_id: String,
        slot: u32,
    },
    CompleteCrocodile {
        game_id: String,
        actor: UserId,
        bet: i64,
    },
    Transfer {
        station_id: String,
        from_user: UserId,
        to_user: UserId,
        amount: i64,
        #[serde(default)]
        description: Option<String>,
    },
    AbandonGame {
        game_id: String,
    },
    LeaveStation {
        user_id: UserId,
        station_id: String,
    },
    DeleteStation {
        actor: UserId,
        station_id: String,
    },
    ListStations {
        user_id: UserId,
    },
    Stats {
        station_id: String,
    },
    ShareCard {
        station_id: String,
        user_id: UserId,
    },
    Quit,
}

/// Rounds a single IPC client may keep open at once.
const MAX_ACTIVE_GAMES: usize = 64;

struct ActiveGame {
    station_id: String,
    state: Arc<CrocodileGameState>,
}

/// Per-connection IPC state: crocodile rounds in flight, keyed by the id
/// handed back to the client.
#[derive(Default)]
struct IpcSession {
    games: HashMap<String, ActiveGame>,
    next_game: u64,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let players = parse_arg(&args, "--players", 4usize);
    let rounds = parse_arg(&args, "--rounds", 10u32);
    let bet = parse_arg(&args, "--bet", 1000i64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = str_arg(&args, "--db").unwrap_or(":memory:");

    let config = match str_arg(&args, "--config") {
        Some(path) => LedgerConfig::load(path)?,
        None => LedgerConfig::default_test(),
    };

    let store = if db == ":memory:" {
        LedgerStore::in_memory()?
    } else {
        LedgerStore::open(db)?
    };
    let mut ledger = StationLedger::new(store, config)?;

    if ipc_mode {
        run_ipc_loop(&mut ledger)?;
    } else {
        println!("Dopamine ledger — station-runner");
        println!("  seed:     {seed}");
        println!("  players:  {players}");
        println!("  rounds:   {rounds}");
        println!("  bet:      {bet}");
        println!("  db:       {db}");
        println!();
        ledger = ledger.with_draw(SeededDraw::new(seed).with_name("trap"));
        run_demo(&mut ledger, seed, players, rounds, bet)?;
    }

    Ok(())
}

fn run_demo(
    ledger: &mut StationLedger,
    seed: u64,
    players: usize,
    rounds: u32,
    bet: i64,
) -> Result<()> {
    let names = ["Alice", "Bob", "Cara", "Dae", "Eun", "Finn", "Gio", "Hana"];
    let ids: Vec<UserId> = (0..players.max(2))
        .map(|i| {
            let name = names.get(i).map(|n| n.to_string()).unwrap_or_else(|| format!("Player{i}"));
            ledger.register_user(&name, None)
        })
        .collect::<Result<_, _>>()?;

    let station = ledger.create_station(&ids[0], "Demo Station", Some("seeded demo run"))?;
    let code = ledger.invite_code(&station)?;
    for id in &ids[1..] {
        ledger.join_by_invite_code(id, &code)?;
    }

    // Separate stream for tooth choices so trap placement stays independent.
    let mut presses = SeededDraw::new(seed ^ 0x9e37_79b9_7f4a_7c15).with_name("presses");
    for round in 0..rounds {
        let mut order = ids.clone();
        order.rotate_left(round as usize % ids.len());
        let mut state = ledger.start_crocodile(&station, &order)?;
        while !state.is_over() {
            let remaining = state.remaining_slots();
            if remaining.is_empty() {
                break;
            }
            let slot = remaining[pick_index(remaining.len(), &mut presses)];
            state = press_slot(&state, slot);
        }
        ledger.complete_crocodile(&station, &order[0], bet, &state)?;
        if let Some(loser) = state.loser() {
            println!("  round {:>3}: {} hit tooth {}", round + 1, loser.nickname, state.trap_index);
        }
    }

    ledger.record_transfer(&station, &ids[1], &ids[0], bet / 2, Some("settling up"))?;

    println!();
    println!("=== LEADERBOARD ===");
    for s in ledger.leaderboard(&station)? {
        print_row(&s);
    }
    Ok(())
}

fn print_row(s: &MemberStats) {
    println!(
        "  {:<10} {:>3}W {:>3}L  game {:>8}  manual {:>8}  total {:>8}  {} {}",
        s.nickname,
        s.wins,
        s.losses,
        format_dopamine(s.game_balance),
        format_dopamine(s.manual_balance),
        format_dopamine(s.total_balance),
        tease_emoji(s.total_balance),
        tease_message(s.total_balance),
    );
}

fn run_ipc_loop(ledger: &mut StationLedger) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();
    let mut session = IpcSession::default();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }
        match session.reply(ledger, &buffer) {
            Some(reply) => {
                writeln!(stdout, "{}", reply)?;
                stdout.flush()?;
            }
            None => break,
        }
    }
    Ok(())
}

impl IpcSession {
    /// Answer one command line. `None` means the client asked to quit.
    /// Failures become `{"error": ..}` replies and the session goes on.
    fn reply(&mut self, ledger: &mut StationLedger, line: &str) -> Option<serde_json::Value> {
        let cmd: IpcCommand = match serde_json::from_str(line) {
            Ok(c) => c,
            Err(e) => return Some(serde_json::json!({ "error": e.to_string() })),
        };
        if matches!(cmd, IpcCommand::Quit) {
            return None;
        }
        Some(match self.handle(ledger, cmd) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("ipc command failed: {e}");
                serde_json::json!({ "error": e.to_string() })
            }
        })
    }

    fn handle(&mut self, ledger: &mut StationLedger, cmd: IpcCommand) -> Result<serde_json::Value> {
        use serde_json::json;

        let reply = match cmd {
            IpcCommand::RegisterUser { nickname, avatar_url } => {
                let user_id = ledger.register_user(&nickname, avatar_url.as_deref())?;
                json!({ "user_id": user_id })
            }
            IpcCommand::CreateStation { owner, title, description } => {
                let station_id = ledger.create_station(&owner, &title, description.as_deref())?;
                let invite_code = ledger.invite_code(&station_id)?;
                json!({ "station_id": station_id, "invite_code": invite_code })
            }
            IpcCommand::Join { user_id, invite_code } => {
                let station_id = ledger.join_by_invite_code(&user_id, &invite_code)?;
                json!({ "station_id": station_id })
            }
            IpcCommand::StartCrocodile { station_id, players } => {
                if self.games.len() >= MAX_ACTIVE_GAMES {
                    anyhow::bail!("too many open games ({MAX_ACTIVE_GAMES}); finish or abandon one");
                }
                let state = ledger.start_crocodile(&station_id, &players)?;
                self.next_game += 1;
                let game_id = format!("game-{}", self.next_game);
                let view = game_view(&game_id, &state);
                self.games.insert(game_id, ActiveGame { station_id, state });
                view
            }
            IpcCommand::Press { game_id, slot } => {
                let game = self
                    .games
                    .get_mut(&game_id)
                    .ok_or_else(|| anyhow::anyhow!("unknown game '{game_id}'"))?;
                if slot >= game.state.slot_count {
                    anyhow::bail!("slot {slot} out of range (0..{})", game.state.slot_count);
                }
                let next = press_slot(&game.state, slot);
                let changed = !Arc::ptr_eq(&next, &game.state);
                game.state = next;
                let mut view = game_view(&game_id, &game.state);
                view["changed"] = json!(changed);
                view
            }
            IpcCommand::CompleteCrocodile { game_id, actor, bet } => {
                let game = self
                    .games
                    .get(&game_id)
                    .ok_or_else(|| anyhow::anyhow!("unknown game '{game_id}'"))?;
                let session_id = ledger.complete_crocodile(&game.station_id, &actor, bet, &game.state)?;
                self.games.remove(&game_id);
                json!({ "session_id": session_id })
            }
            IpcCommand::AbandonGame { game_id } => {
                self.games
                    .remove(&game_id)
                    .ok_or_else(|| anyhow::anyhow!("unknown game '{game_id}'"))?;
                json!({ "abandoned": game_id })
            }
            IpcCommand::LeaveStation { user_id, station_id } => {
                ledger.leave_station(&user_id, &station_id)?;
                json!({ "left": station_id })
            }
            IpcCommand::DeleteStation { actor, station_id } => {
                ledger.delete_station(&actor, &station_id)?;
                self.games.retain(|_, g| g.station_id != station_id);
                json!({ "deleted": station_id })
            }
            IpcCommand::ListStations { user_id } => {
                json!({ "stations": ledger.stations_for(&user_id)? })
            }
            IpcCommand::Transfer { station_id, from_user, to_user, amount, description } => {
                let entry_id = ledger.record_transfer(
                    &station_id,
                    &from_user,
                    &to_user,
                    amount,
                    description.as_deref(),
                )?;
                json!({ "entry_id": entry_id })
            }
            IpcCommand::Stats { station_id } => {
                json!({ "stats": ledger.leaderboard(&station_id)? })
            }
            IpcCommand::ShareCard { station_id, user_id } => {
                serde_json::to_value(ledger.share_card(&station_id, &user_id)?)?
            }
            IpcCommand::Quit => json!({}),
        };
        Ok(reply)
    }
}

/// Client-facing view of a round. The trap stays hidden until it is hit.
fn game_view(game_id: &str, state: &CrocodileGameState) -> serde_json::Value {
    serde_json::json!({
        "game_id": game_id,
        "slot_count": state.slot_count,
        "pressed_slots": state.pressed_slots,
        "current_player": state.current_player().map(|p| &p.user_id),
        "loser_id": state.loser_id,
        "trap_index": state.is_over().then_some(state.trap_index),
    })
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn ledger() -> StationLedger {
        let store = LedgerStore::in_memory().expect("in-memory store");
        StationLedger::new(store, LedgerConfig::default_test())
            .expect("ledger")
            // trap always on the last tooth
            .with_draw(|n: u32| n - 1)
    }

    fn send(session: &mut IpcSession, ledger: &mut StationLedger, cmd: Value) -> Value {
        session.reply(ledger, &cmd.to_string()).expect("reply")
    }

    /// Alice owns a station Bob has joined. Returns (alice, bob, station).
    fn setup(session: &mut IpcSession, ledger: &mut StationLedger) -> (String, String, String) {
        let alice = send(session, ledger, json!({ "type": "register_user", "nickname": "Alice" }));
        let bob = send(session, ledger, json!({ "type": "register_user", "nickname": "Bob" }));
        let alice = alice["user_id"].as_str().expect("alice id").to_string();
        let bob = bob["user_id"].as_str().expect("bob id").to_string();

        let created = send(
            session,
            ledger,
            json!({ "type": "create_station", "owner": alice, "title": "Crew" }),
        );
        let station = created["station_id"].as_str().expect("station id").to_string();
        let joined = send(
            session,
            ledger,
            json!({ "type": "join", "user_id": bob, "invite_code": created["invite_code"] }),
        );
        assert_eq!(joined["station_id"], json!(station));
        (alice, bob, station)
    }

    #[test]
    fn press_reports_whether_the_round_changed() {
        let mut ledger = ledger();
        let mut session = IpcSession::default();
        let (alice, bob, station) = setup(&mut session, &mut ledger);

        let started = send(
            &mut session,
            &mut ledger,
            json!({ "type": "start_crocodile", "station_id": station, "players": [alice, bob] }),
        );
        assert_eq!(started["game_id"], json!("game-1"));
        assert!(started["trap_index"].is_null());

        let press = json!({ "type": "press", "game_id": "game-1", "slot": 0 });
        let first = send(&mut session, &mut ledger, press.clone());
        assert_eq!(first["changed"], json!(true));
        assert_eq!(first["current_player"], json!(bob));
        assert!(first["trap_index"].is_null());

        let again = send(&mut session, &mut ledger, press);
        assert_eq!(again["changed"], json!(false));
        assert_eq!(again["pressed_slots"], json!([0]));

        let trap = send(
            &mut session,
            &mut ledger,
            json!({ "type": "press", "game_id": "game-1", "slot": 11 }),
        );
        assert_eq!(trap["loser_id"], json!(bob));
        assert_eq!(trap["trap_index"], json!(11));

        let done = send(
            &mut session,
            &mut ledger,
            json!({ "type": "complete_crocodile", "game_id": "game-1", "actor": alice, "bet": 500 }),
        );
        assert!(done["session_id"].is_string());
        assert!(session.games.is_empty());

        let stats = send(&mut session, &mut ledger, json!({ "type": "stats", "station_id": station }));
        assert_eq!(stats["stats"][0]["user_id"], json!(alice));
        assert_eq!(stats["stats"][0]["total_balance"], json!(500));
    }

    #[test]
    fn errors_are_replies_and_the_session_continues() {
        let mut ledger = ledger();
        let mut session = IpcSession::default();
        let (alice, bob, station) = setup(&mut session, &mut ledger);

        let garbled = session.reply(&mut ledger, "{ not json").expect("reply");
        assert!(garbled["error"].is_string());

        let unknown = send(&mut session, &mut ledger, json!({ "type": "press", "game_id": "nope", "slot": 0 }));
        assert!(unknown["error"].as_str().expect("message").contains("nope"));

        send(
            &mut session,
            &mut ledger,
            json!({ "type": "start_crocodile", "station_id": station, "players": [alice, bob] }),
        );
        let out_of_range = send(
            &mut session,
            &mut ledger,
            json!({ "type": "press", "game_id": "game-1", "slot": 40 }),
        );
        assert!(out_of_range["error"].is_string());
        assert!(session.games["game-1"].state.pressed_slots.is_empty());

        let abandoned = send(&mut session, &mut ledger, json!({ "type": "abandon_game", "game_id": "game-1" }));
        assert_eq!(abandoned["abandoned"], json!("game-1"));
        assert!(session.games.is_empty());

        let listed = send(&mut session, &mut ledger, json!({ "type": "list_stations", "user_id": bob }));
        assert_eq!(listed["stations"][0]["member_count"], json!(2));

        assert!(session.reply(&mut ledger, r#"{"type":"quit"}"#).is_none());
    }
}
