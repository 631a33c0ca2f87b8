//! Public share handlers. No session required.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::file::ShareService;
use crate::web::dto::{ApiResponse, FolderDetailResponse, SharedFileResponse};
use crate::web::error::ApiError;

use super::AppState;

/// GET /api/share/folders/{folder_id} - Public folder and its public files.
#[utoipa::path(
    get,
    path = "/api/share/folders/{folder_id}",
    tag = "share",
    params(("folder_id" = i64, Path, description = "Folder ID")),
    responses(
        (status = 200, description = "Public folder", body = FolderDetailResponse),
        (status = 404, description = "Folder not found or private")
    )
)]
pub async fn shared_folder(
    State(state): State<Arc<AppState>>,
    Path(folder_id): Path<i64>,
) -> Result<Json<ApiResponse<FolderDetailResponse>>, ApiError> {
    let folder = ShareService::new(state.db.pool(), &*state.images)
        .folder(folder_id)
        .await?;

    Ok(Json(ApiResponse::new(folder.into())))
}

/// GET /api/share/files/{file_id} - Public file with its URL.
#[utoipa::path(
    get,
    path = "/api/share/files/{file_id}",
    tag = "share",
    params(("file_id" = i64, Path, description = "File ID")),
    responses(
        (status = 200, description = "Public file", body = SharedFileResponse),
        (status = 404, description = "File not found or private")
    )
)]
pub async fn shared_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<SharedFileResponse>>, ApiError> {
    let file = ShareService::new(state.db.pool(), &*state.images)
        .file(file_id)
        .await?;

    Ok(Json(ApiResponse::new(file.into())))
}
