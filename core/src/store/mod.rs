//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The ledger calls store methods and hands the rows it gets back to the
//! pure aggregator; nothing else executes SQL.

use crate::{config::GameTypeConfig, error::LedgerResult};
use rusqlite::{params, Connection, OptionalExtension};

mod game;
mod station;
mod transfer;
mod user;

pub use station::StationSummary;

pub struct LedgerStore {
    conn: Connection,
}

impl LedgerStore {
    pub fn open(path: &str) -> LedgerResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        log::debug!("opened ledger store at {path}");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> LedgerResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> LedgerResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Game types ────────────────────────────────────────────────

    /// Insert or refresh the configured game types, keyed by slug.
    pub fn sync_game_types(&self, game_types: &[GameTypeConfig]) -> LedgerResult<()> {
        for game_type in game_types {
            let config_json = serde_json::to_string(game_type)?;
            self.conn.execute(
                "INSERT INTO game_types (slug, name, description, config)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(slug) DO UPDATE SET
                     name = excluded.name,
                     description = excluded.description,
                     config = excluded.config",
                params![game_type.slug, game_type.name, game_type.description, config_json],
            )?;
        }
        Ok(())
    }

    pub fn game_type_id(&self, slug: &str) -> LedgerResult<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM game_types WHERE slug = ?1",
                params![slug],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Stored config for a game type, as written by `sync_game_types`.
    pub fn game_type_config(&self, slug: &str) -> LedgerResult<Option<GameTypeConfig>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT config FROM game_types WHERE slug = ?1",
                params![slug],
                |row| row.get(0),
            )
            .optional()?;
        match json {
            Some(j) => Ok(Some(serde_json::from_str(&j)?)),
            None => Ok(None),
        }
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
