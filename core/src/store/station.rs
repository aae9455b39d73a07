use super::{new_id, now_rfc3339, LedgerStore};
use crate::{
    error::LedgerResult,
    member::{Member, MemberRole, UserProfile},
    types::StationId,
};
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

/// One station with its head count, as listed on a user's home screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StationSummary {
    pub station_id:   StationId,
    pub title:        String,
    pub description:  Option<String>,
    pub invite_code:  String,
    pub member_count: u32,
    pub created_at:   String,
}

const SUMMARY_COLUMNS: &str = "s.id, s.title, s.description, s.invite_code,
    (SELECT COUNT(*) FROM station_members c WHERE c.station_id = s.id),
    s.created_at";

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<StationSummary> {
    Ok(StationSummary {
        station_id:   row.get(0)?,
        title:        row.get(1)?,
        description:  row.get(2)?,
        invite_code:  row.get(3)?,
        member_count: row.get(4)?,
        created_at:   row.get(5)?,
    })
}

impl LedgerStore {
    // ── Stations ──────────────────────────────────────────────────

    /// Create a station and enroll `owner` as its owner.
    /// Both rows commit together or not at all.
    pub fn create_station(
        &self,
        owner: &str,
        title: &str,
        description: Option<&str>,
        invite_code: &str,
    ) -> LedgerResult<StationId> {
        let station_id = new_id();
        let now = now_rfc3339();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO stations (id, title, description, invite_code, created_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![station_id, title, description, invite_code, owner, now],
        )?;
        tx.execute(
            "INSERT INTO station_members (station_id, user_id, role, joined_at)
             VALUES (?1, ?2, 'owner', ?3)",
            params![station_id, owner, now],
        )?;
        tx.commit()?;
        Ok(station_id)
    }

    pub fn station_title(&self, station_id: &str) -> LedgerResult<Option<String>> {
        let title = self
            .conn
            .query_row(
                "SELECT title FROM stations WHERE id = ?1",
                params![station_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(title)
    }

    pub fn station_invite_code(&self, station_id: &str) -> LedgerResult<Option<String>> {
        let code = self
            .conn
            .query_row(
                "SELECT invite_code FROM stations WHERE id = ?1",
                params![station_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(code)
    }

    pub fn station_by_invite_code(&self, code: &str) -> LedgerResult<Option<StationId>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM stations WHERE invite_code = ?1",
                params![code],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Delete a station. Members, sessions, participants and transfers
    /// go with it through `ON DELETE CASCADE`.
    pub fn delete_station(&self, station_id: &str) -> LedgerResult<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM stations WHERE id = ?1", params![station_id])?;
        Ok(deleted > 0)
    }

    pub fn station_summary(&self, station_id: &str) -> LedgerResult<Option<StationSummary>> {
        let sql = format!("SELECT {SUMMARY_COLUMNS} FROM stations s WHERE s.id = ?1");
        let summary = self
            .conn
            .query_row(&sql, params![station_id], summary_from_row)
            .optional()?;
        Ok(summary)
    }

    /// Stations `user_id` belongs to, newest first.
    pub fn stations_for_user(&self, user_id: &str) -> LedgerResult<Vec<StationSummary>> {
        let sql = format!(
            "SELECT {SUMMARY_COLUMNS}
             FROM stations s
             JOIN station_members sm ON sm.station_id = s.id
             WHERE sm.user_id = ?1
             ORDER BY s.created_at DESC, s.rowid DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], summary_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Membership ────────────────────────────────────────────────

    /// Add a member. Returns false when the user was already a member.
    pub fn add_member(&self, station_id: &str, user_id: &str, role: MemberRole) -> LedgerResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO station_members (station_id, user_id, role, joined_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![station_id, user_id, role.as_str(), now_rfc3339()],
        )?;
        Ok(inserted > 0)
    }

    /// Remove a member. Returns false when there was nothing to remove.
    pub fn remove_member(&self, station_id: &str, user_id: &str) -> LedgerResult<bool> {
        let removed = self.conn.execute(
            "DELETE FROM station_members WHERE station_id = ?1 AND user_id = ?2",
            params![station_id, user_id],
        )?;
        Ok(removed > 0)
    }

    pub fn member_role(&self, station_id: &str, user_id: &str) -> LedgerResult<Option<MemberRole>> {
        let role: Option<String> = self
            .conn
            .query_row(
                "SELECT role FROM station_members WHERE station_id = ?1 AND user_id = ?2",
                params![station_id, user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(role.as_deref().map(MemberRole::parse))
    }

    pub fn is_member(&self, station_id: &str, user_id: &str) -> LedgerResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM station_members WHERE station_id = ?1 AND user_id = ?2",
            params![station_id, user_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Members in join order, with their profile when the user still exists.
    pub fn members(&self, station_id: &str) -> LedgerResult<Vec<Member>> {
        let mut stmt = self.conn.prepare(
            "SELECT sm.user_id, sm.role, u.nickname, u.avatar_url
             FROM station_members sm
             LEFT JOIN users u ON u.id = sm.user_id
             WHERE sm.station_id = ?1
             ORDER BY sm.rowid ASC",
        )?;
        let rows = stmt.query_map(params![station_id], |row| {
            let nickname: Option<String> = row.get(2)?;
            let avatar_url: Option<String> = row.get(3)?;
            Ok(Member {
                user_id: row.get(0)?,
                role:    MemberRole::parse(&row.get::<_, String>(1)?),
                profile: nickname.map(|nickname| UserProfile { nickname, avatar_url }),
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
