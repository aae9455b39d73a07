use super::{new_id, now_rfc3339, LedgerStore};
use crate::{error::LedgerResult, member::ManualTransfer};
use rusqlite::params;

impl LedgerStore {
    // ── Manual transfers ──────────────────────────────────────────

    pub fn insert_transfer(
        &self,
        station_id:  &str,
        transfer:    &ManualTransfer,
        description: Option<&str>,
    ) -> LedgerResult<String> {
        let entry_id = new_id();
        self.conn.execute(
            "INSERT INTO manual_entries (id, station_id, from_user, to_user, amount, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry_id,
                station_id,
                transfer.from_user,
                transfer.to_user,
                transfer.amount,
                description,
                now_rfc3339(),
            ],
        )?;
        Ok(entry_id)
    }

    pub fn transfers(&self, station_id: &str) -> LedgerResult<Vec<ManualTransfer>> {
        let mut stmt = self.conn.prepare(
            "SELECT from_user, to_user, amount FROM manual_entries
             WHERE station_id = ?1
             ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map(params![station_id], |row| {
            Ok(ManualTransfer {
                from_user: row.get(0)?,
                to_user:   row.get(1)?,
                amount:    row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn transfer_description(&self, entry_id: &str) -> LedgerResult<Option<String>> {
        let description: Option<String> = self.conn.query_row(
            "SELECT description FROM manual_entries WHERE id = ?1",
            params![entry_id],
            |row| row.get(0),
        )?;
        Ok(description)
    }
}
