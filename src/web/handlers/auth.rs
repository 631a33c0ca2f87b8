//! Authentication handlers.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

use crate::auth::{self, SESSION_COOKIE};
use crate::web::dto::{
    ApiResponse, LoginRequest, LoginResponse, MessageResponse, SignupRequest, UserInfo,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

use super::AppState;

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(
            i64::try_from(state.session_expiry_secs).unwrap_or(i64::MAX),
        ))
        .secure(state.secure_cookies)
        .build()
}

/// POST /api/auth/signup - Create an account.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = UserInfo),
        (status = 422, description = "Invalid fields")
    )
)]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserInfo>>), ApiError> {
    let user = auth::register(state.db.pool(), req.into()).await?;

    tracing::info!(user_id = user.id, username = %user.username, "User signed up");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(UserInfo::from(user))),
    ))
}

/// POST /api/auth/login - Start a session.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = LoginResponse),
        (status = 401, description = "Incorrect username or password"),
        (status = 429, description = "Too many login attempts")
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<LoginResponse>>), ApiError> {
    let (user, session) = auth::login(
        state.db.pool(),
        &req.username,
        &req.password,
        state.session_expiry_secs,
    )
    .await?;

    let jar = jar.add(session_cookie(&state, session.token.clone()));

    let response = LoginResponse {
        token: session.token,
        expires_in: state.session_expiry_secs,
        user: user.into(),
    };

    Ok((jar, Json(ApiResponse::new(response))))
}

/// POST /api/auth/logout - End the current session.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Signed out", body = MessageResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("session" = []))
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    auth_user: AuthUser,
) -> Result<(CookieJar, Json<ApiResponse<MessageResponse>>), ApiError> {
    auth::logout(state.db.pool(), &auth_user.token).await?;

    tracing::info!(user_id = auth_user.user.id, "User signed out");

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Json(ApiResponse::new(MessageResponse::new("Signed out")))))
}

/// GET /api/auth/me - Current user.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 401, description = "Unauthorized")
    ),
    security(("session" = []))
)]
pub async fn me(AuthUser { user, .. }: AuthUser) -> Json<ApiResponse<UserInfo>> {
    Json(ApiResponse::new(user.into()))
}
