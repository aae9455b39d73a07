use super::{new_id, now_rfc3339, LedgerStore};
use crate::{error::LedgerResult, member::UserProfile, types::UserId};
use rusqlite::{params, OptionalExtension};

impl LedgerStore {
    // ── Users ─────────────────────────────────────────────────────

    pub fn insert_user(&self, nickname: &str, avatar_url: Option<&str>) -> LedgerResult<UserId> {
        let user_id = new_id();
        self.conn.execute(
            "INSERT INTO users (id, nickname, avatar_url, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, nickname, avatar_url, now_rfc3339()],
        )?;
        Ok(user_id)
    }

    pub fn user_profile(&self, user_id: &str) -> LedgerResult<Option<UserProfile>> {
        let profile = self
            .conn
            .query_row(
                "SELECT nickname, avatar_url FROM users WHERE id = ?1",
                params![user_id],
                |row| {
                    Ok(UserProfile {
                        nickname:   row.get(0)?,
                        avatar_url: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(profile)
    }

    pub fn delete_user(&self, user_id: &str) -> LedgerResult<()> {
        self.conn
            .execute("DELETE FROM users WHERE id = ?1", params![user_id])?;
        Ok(())
    }
}
