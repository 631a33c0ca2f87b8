//! Session authentication extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    extract::CookieJar,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::sync::Arc;

use crate::auth::{self, SESSION_COOKIE};
use crate::db::User;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Extractor for authenticated users.
///
/// The session token is read from `Authorization: Bearer <token>` first and
/// the `session` cookie second, then checked against the sessions table.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The signed-in user.
    pub user: User,
    /// The session token used for this request.
    pub token: String,
}

/// Pull the session token out of the request, if any.
pub(crate) async fn session_token<S>(parts: &mut Parts, state: &S) -> Option<String>
where
    S: Send + Sync,
{
    if let Ok(TypedHeader(Authorization(bearer))) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await
    {
        return Some(bearer.token().to_string());
    }

    CookieJar::from_headers(&parts.headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts, state)
            .await
            .ok_or_else(|| ApiError::unauthorized("Missing authorization"))?;

        let user = auth::authenticate(state.db.pool(), &token)
            .await
            .map_err(|e| {
                tracing::debug!("Session validation failed: {}", e);
                ApiError::from(e)
            })?;

        Ok(AuthUser { user, token })
    }
}
