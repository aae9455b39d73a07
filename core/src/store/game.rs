use super::{new_id, now_rfc3339, LedgerStore};
use crate::{
    error::LedgerResult,
    member::{GameOutcome, GameResultRecord},
    types::{Dopamine, SessionId},
};
use rusqlite::params;

impl LedgerStore {
    // ── Game sessions ─────────────────────────────────────────────

    /// Persist a finished round: one `completed` session plus one
    /// participant row per result. All rows commit together.
    pub fn insert_completed_game(
        &self,
        station_id:   &str,
        game_type_id: i64,
        bet_amount:   Dopamine,
        created_by:   &str,
        results:      &[GameResultRecord],
    ) -> LedgerResult<SessionId> {
        let session_id = new_id();
        let now = now_rfc3339();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO game_sessions (id, station_id, game_type_id, bet_amount, status, created_by, created_at)
             VALUES (?1, ?2, ?3, ?4, 'completed', ?5, ?6)",
            params![session_id, station_id, game_type_id, bet_amount, created_by, now],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO game_participants (id, session_id, user_id, result, dopamine_change, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for r in results {
                stmt.execute(params![
                    new_id(),
                    session_id,
                    r.user_id,
                    r.result.map(|o| o.as_str()),
                    r.dopamine_change,
                    now,
                ])?;
            }
        }
        tx.commit()?;
        Ok(session_id)
    }

    /// Participant rows of every completed session in the station.
    pub fn completed_game_results(&self, station_id: &str) -> LedgerResult<Vec<GameResultRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT gp.user_id, gp.result, gp.dopamine_change
             FROM game_participants gp
             JOIN game_sessions gs ON gs.id = gp.session_id
             WHERE gs.station_id = ?1 AND gs.status = 'completed'
             ORDER BY gp.rowid ASC",
        )?;
        let rows = stmt.query_map(params![station_id], |row| {
            let result: Option<String> = row.get(1)?;
            Ok(GameResultRecord {
                user_id:         row.get(0)?,
                result:          result.as_deref().and_then(GameOutcome::parse),
                dopamine_change: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Number of completed sessions in the station (for tests and summaries).
    pub fn completed_session_count(&self, station_id: &str) -> LedgerResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM game_sessions WHERE station_id = ?1 AND status = 'completed'",
            params![station_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
