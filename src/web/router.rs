//! Router configuration for Web API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_folder, delete_file, delete_folder, get_file, get_folder, list_folders,
    list_visibilities, login, logout, me, shared_file, shared_folder, signup, update_file,
    update_folder, upload_file, AppState,
};
use super::middleware::{
    api_rate_limit, create_cors_layer, login_rate_limit, security_headers, RateLimitState,
};

/// Room for multipart framing and text fields on top of the image itself.
const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    rate_limit: Arc<RateLimitState>,
    cors_origins: &[String],
) -> Router {
    let login_limit = rate_limit.clone();
    let auth_routes = Router::new()
        .route("/signup", post(signup))
        .route(
            "/login",
            post(login).layer(middleware::from_fn(move |req, next| {
                let state = login_limit.clone();
                login_rate_limit(state, req, next)
            })),
        )
        .route("/logout", post(logout))
        .route("/me", get(me));

    let upload_limit = usize::try_from(app_state.max_upload_size.saturating_add(MULTIPART_OVERHEAD))
        .unwrap_or(usize::MAX);
    let folder_routes = Router::new()
        .route("/", get(list_folders).post(create_folder))
        .route(
            "/:folder_id",
            get(get_folder).put(update_folder).delete(delete_folder),
        )
        .route(
            "/:folder_id/files",
            post(upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/:folder_id/files/:file_id",
            get(get_file).put(update_file).delete(delete_file),
        );

    let share_routes = Router::new()
        .route("/folders/:folder_id", get(shared_folder))
        .route("/files/:file_id", get(shared_file));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .route("/visibilities", get(list_visibilities))
        .nest("/folders", folder_routes)
        .nest("/share", share_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(security_headers))
                .layer(middleware::from_fn(move |req, next| {
                    let state = rate_limit.clone();
                    api_rate_limit(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
