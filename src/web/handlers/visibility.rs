//! Visibility option handlers.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::db::VisibilityRepository;
use crate::web::dto::{ApiResponse, VisibilityResponse};
use crate::web::error::ApiError;

use super::AppState;

/// GET /api/visibilities - List visibility options.
#[utoipa::path(
    get,
    path = "/api/visibilities",
    tag = "visibilities",
    responses(
        (status = 200, description = "Visibility options", body = Vec<VisibilityResponse>)
    )
)]
pub async fn list_visibilities(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<VisibilityResponse>>>, ApiError> {
    let options = VisibilityRepository::new(state.db.pool()).list().await?;

    Ok(Json(ApiResponse::new(
        options.into_iter().map(VisibilityResponse::from).collect(),
    )))
}
