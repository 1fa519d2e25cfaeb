use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Error, OptionalExtension};
use tracing::info;
use uuid::Uuid;

use super::Database;
use crate::models::user::User;

/// Sessions older than this no longer identify anyone and are pruned at the next login.
pub const SESSION_LIFETIME_DAYS: i64 = 14;

fn session_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(SESSION_LIFETIME_DAYS)
}

impl Database {
    /// Inserts a user; `None` when the username is already taken.
    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<i64>, Error> {
        let conn = self.conn.lock().await;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO users (username, password_hash, date_joined) VALUES (?, ?, ?)",
            params![username, password_hash, now],
        )?;
        if inserted == 0 {
            return Ok(None);
        }
        let id = conn.last_insert_rowid();
        info!("User registered: {} ({})", username, id);
        Ok(Some(id))
    }

    pub async fn username_taken(&self, username: &str) -> Result<bool, Error> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)",
            [username],
            |row| row.get(0),
        )
    }

    /// The user and their stored password hash.
    pub async fn find_credentials(&self, username: &str) -> Result<Option<(User, String)>, Error> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT id, username, date_joined, password_hash FROM users WHERE username = ?",
            [username],
            |row| {
                Ok((
                    User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        date_joined: row.get(2)?,
                    },
                    row.get(3)?,
                ))
            },
        )
        .optional()
    }

    pub async fn create_session(&self, user_id: i64, now: DateTime<Utc>) -> Result<String, Error> {
        let token = Uuid::new_v4().simple().to_string();
        let conn = self.conn.lock().await;
        let pruned = conn.execute(
            "DELETE FROM sessions WHERE created_at < ?",
            [session_cutoff(now)],
        )?;
        if pruned > 0 {
            info!("Pruned {} expired sessions", pruned);
        }
        conn.execute(
            "INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, ?)",
            params![token, user_id, now],
        )?;
        Ok(token)
    }

    pub async fn user_for_session(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, Error> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT u.id, u.username, u.date_joined
             FROM sessions s JOIN users u ON u.id = s.user_id
             WHERE s.token = ? AND s.created_at >= ?",
            params![token, session_cutoff(now)],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    date_joined: row.get(2)?,
                })
            },
        )
        .optional()
    }

    pub async fn delete_session(&self, token: &str) -> Result<(), Error> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM sessions WHERE token = ?", [token])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SESSION_LIFETIME_DAYS;
    use crate::db::tests::create_test_db;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_usernames_are_unique() {
        let db = create_test_db().await;
        let now = Utc::now();
        assert!(db.create_user("aria", "hash", now).await.unwrap().is_some());
        assert!(db.create_user("aria", "other", now).await.unwrap().is_none());
        assert!(db.username_taken("aria").await.unwrap());
        assert!(!db.username_taken("ben").await.unwrap());
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let db = create_test_db().await;
        let now = Utc::now();
        let id = db.create_user("chloe", "hash", now).await.unwrap().unwrap();

        let token = db.create_session(id, now).await.unwrap();
        let user = db.user_for_session(&token, now).await.unwrap().unwrap();
        assert_eq!(user.username, "chloe");

        let (found, hash) = db.find_credentials("chloe").await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(hash, "hash");

        db.delete_session(&token).await.unwrap();
        assert!(db.user_for_session(&token, now).await.unwrap().is_none());
        assert!(db.user_for_session("bogus", now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sessions_expire_and_are_pruned() {
        let db = create_test_db().await;
        let now = Utc::now();
        let id = db.create_user("dana", "hash", now).await.unwrap().unwrap();

        let old = db
            .create_session(id, now - Duration::days(SESSION_LIFETIME_DAYS + 1))
            .await
            .unwrap();
        assert!(db.user_for_session(&old, now).await.unwrap().is_none());

        let fresh = db.create_session(id, now).await.unwrap();
        assert!(db.user_for_session(&fresh, now).await.unwrap().is_some());
        let remaining: i64 = db
            .conn
            .lock()
            .await
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 1);
    }
}
