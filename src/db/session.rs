//! Login session repository.

use sqlx::SqlitePool;

use crate::{FileshareError, Result};

/// A login session.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    /// Session ID.
    pub id: i64,
    /// Owning user ID.
    pub user_id: i64,
    /// Opaque session token.
    pub token: String,
    /// Expiration timestamp (`YYYY-MM-DD HH:MM:SS`, UTC).
    pub expires_at: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// New session for creation.
#[derive(Debug, Clone)]
pub struct NewSession {
    /// Owning user ID.
    pub user_id: i64,
    /// Opaque session token.
    pub token: String,
    /// Expiration timestamp (`YYYY-MM-DD HH:MM:SS`, UTC).
    pub expires_at: String,
}

impl NewSession {
    /// Create a session with a random token expiring after `lifetime_secs`.
    ///
    /// Fails when the lifetime is zero or the expiry is not representable.
    pub fn generate(user_id: i64, lifetime_secs: u64) -> Result<Self> {
        let invalid = || {
            FileshareError::Validation(format!("invalid session lifetime: {lifetime_secs}s"))
        };
        if lifetime_secs == 0 {
            return Err(invalid());
        }
        let lifetime = i64::try_from(lifetime_secs)
            .ok()
            .and_then(chrono::TimeDelta::try_seconds)
            .ok_or_else(invalid)?;
        let expires_at = chrono::Utc::now()
            .checked_add_signed(lifetime)
            .ok_or_else(invalid)?;

        Ok(Self {
            user_id,
            token: uuid::Uuid::new_v4().to_string(),
            expires_at: expires_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
    }
}

/// Repository for session operations.
pub struct SessionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new session.
    pub async fn create(&self, new_session: &NewSession) -> Result<Session> {
        let result =
            sqlx::query("INSERT INTO sessions (user_id, token, expires_at) VALUES (?, ?, ?)")
                .bind(new_session.user_id)
                .bind(&new_session.token)
                .bind(&new_session.expires_at)
                .execute(self.pool)
                .await
                .map_err(|e| FileshareError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        sqlx::query_as::<_, Session>(
            "SELECT id, user_id, token, expires_at, created_at FROM sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| FileshareError::Database(e.to_string()))?
        .ok_or_else(|| FileshareError::NotFound("session".to_string()))
    }

    /// Get an unexpired session by token.
    pub async fn get_valid(&self, token: &str) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT id, user_id, token, expires_at, created_at
             FROM sessions
             WHERE token = ? AND expires_at > datetime('now')",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| FileshareError::Database(e.to_string()))?;

        Ok(session)
    }

    /// Delete a session by token.
    pub async fn delete(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(self.pool)
            .await
            .map_err(|e| FileshareError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete expired sessions.
    pub async fn cleanup_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= datetime('now')")
            .execute(self.pool)
            .await
            .map_err(|e| FileshareError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
