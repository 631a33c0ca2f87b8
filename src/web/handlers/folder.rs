//! Folder handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::file::FolderService;
use crate::web::dto::{
    ApiResponse, FolderDetailResponse, FolderRequest, FolderResponse, MessageResponse,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

use super::AppState;

/// GET /api/folders - List the caller's folders.
#[utoipa::path(
    get,
    path = "/api/folders",
    tag = "folders",
    responses(
        (status = 200, description = "Folders owned by the caller", body = Vec<FolderResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("session" = []))
)]
pub async fn list_folders(
    State(state): State<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
) -> Result<Json<ApiResponse<Vec<FolderResponse>>>, ApiError> {
    let folders = FolderService::new(state.db.pool(), &*state.images)
        .list(&user)
        .await?;

    Ok(Json(ApiResponse::new(
        folders.into_iter().map(FolderResponse::from).collect(),
    )))
}

/// POST /api/folders - Create a folder.
#[utoipa::path(
    post,
    path = "/api/folders",
    tag = "folders",
    request_body = FolderRequest,
    responses(
        (status = 201, description = "Folder created", body = FolderResponse),
        (status = 400, description = "Folder limit reached"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Invalid fields")
    ),
    security(("session" = []))
)]
pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
    ValidatedJson(req): ValidatedJson<FolderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FolderResponse>>), ApiError> {
    let folder = FolderService::new(state.db.pool(), &*state.images)
        .create(&user, &req.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(FolderResponse::from(folder))),
    ))
}

/// GET /api/folders/{folder_id} - Folder with its files.
#[utoipa::path(
    get,
    path = "/api/folders/{folder_id}",
    tag = "folders",
    params(("folder_id" = i64, Path, description = "Folder ID")),
    responses(
        (status = 200, description = "Folder with its files", body = FolderDetailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Folder not found")
    ),
    security(("session" = []))
)]
pub async fn get_folder(
    State(state): State<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
    Path(folder_id): Path<i64>,
) -> Result<Json<ApiResponse<FolderDetailResponse>>, ApiError> {
    let folder = FolderService::new(state.db.pool(), &*state.images)
        .get_with_files(&user, folder_id)
        .await?;

    Ok(Json(ApiResponse::new(folder.into())))
}

/// PUT /api/folders/{folder_id} - Edit a folder.
#[utoipa::path(
    put,
    path = "/api/folders/{folder_id}",
    tag = "folders",
    params(("folder_id" = i64, Path, description = "Folder ID")),
    request_body = FolderRequest,
    responses(
        (status = 200, description = "Folder updated", body = FolderResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Folder not found"),
        (status = 422, description = "Invalid fields")
    ),
    security(("session" = []))
)]
pub async fn update_folder(
    State(state): State<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
    Path(folder_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<FolderRequest>,
) -> Result<Json<ApiResponse<FolderResponse>>, ApiError> {
    let folder = FolderService::new(state.db.pool(), &*state.images)
        .update(&user, folder_id, &req.into())
        .await?;

    Ok(Json(ApiResponse::new(folder.into())))
}

/// DELETE /api/folders/{folder_id} - Delete a folder and its images.
#[utoipa::path(
    delete,
    path = "/api/folders/{folder_id}",
    tag = "folders",
    params(("folder_id" = i64, Path, description = "Folder ID")),
    responses(
        (status = 200, description = "Folder deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Folder not found"),
        (status = 500, description = "Image provider failure; nothing deleted locally")
    ),
    security(("session" = []))
)]
pub async fn delete_folder(
    State(state): State<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
    Path(folder_id): Path<i64>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    FolderService::new(state.db.pool(), &*state.images)
        .delete(&user, folder_id)
        .await?;

    Ok(Json(ApiResponse::new(MessageResponse::new("Folder deleted"))))
}
