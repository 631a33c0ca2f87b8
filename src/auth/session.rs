//! Login sessions for fileshare.
//!
//! Sessions are database rows keyed by a random token. The token travels in
//! the `session` cookie or an `Authorization: Bearer` header.

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::auth::verify_password;
use crate::db::{NewSession, Session, SessionRepository, User, UserRepository};
use crate::{FileshareError, Result};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Default session lifetime (1 day).
pub const DEFAULT_SESSION_DURATION_SECS: u64 = 24 * 60 * 60;

const INVALID_CREDENTIALS: &str = "Incorrect username or password";

/// Verify credentials and open a new session.
///
/// Unknown usernames and wrong passwords produce the same error.
pub async fn login(
    pool: &SqlitePool,
    username: &str,
    password: &str,
    lifetime_secs: u64,
) -> Result<(User, Session)> {
    let user = match UserRepository::new(pool).get_by_username(username).await? {
        Some(user) => user,
        None => {
            debug!(username = %username, "Login failed: unknown user");
            return Err(FileshareError::Auth(INVALID_CREDENTIALS.to_string()));
        }
    };

    if verify_password(password, &user.password).is_err() {
        warn!(username = %user.username, "Login failed: wrong password");
        return Err(FileshareError::Auth(INVALID_CREDENTIALS.to_string()));
    }

    let session = SessionRepository::new(pool)
        .create(&NewSession::generate(user.id, lifetime_secs)?)
        .await?;

    info!(username = %user.username, user_id = user.id, "User logged in");
    Ok((user, session))
}

/// Resolve a session token to its user.
pub async fn authenticate(pool: &SqlitePool, token: &str) -> Result<User> {
    let session = SessionRepository::new(pool)
        .get_valid(token)
        .await?
        .ok_or_else(|| FileshareError::Auth("Invalid or expired session".to_string()))?;

    UserRepository::new(pool)
        .get_by_id(session.user_id)
        .await?
        .ok_or_else(|| FileshareError::Auth("User not found".to_string()))
}

/// Close a session. Unknown tokens are ignored.
pub async fn logout(pool: &SqlitePool, token: &str) -> Result<()> {
    if SessionRepository::new(pool).delete(token).await? {
        debug!("Session closed");
    }
    Ok(())
}

/// Remove expired sessions, returning how many were deleted.
pub async fn cleanup_expired_sessions(pool: &SqlitePool) -> Result<u64> {
    SessionRepository::new(pool).cleanup_expired().await
}
