//! File handlers.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::file::{FileForm, FileService, TempUpload};
use crate::web::dto::{
    ApiResponse, FileDetailResponse, FileEditRequest, FileResponse, MessageResponse,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

use super::AppState;

/// Multipart upload form for images.
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct FileUploadForm {
    /// Image file.
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
    /// File name (lowercase letters and numbers).
    name: String,
    /// Optional description.
    description: Option<String>,
    /// Visibility option ID.
    visibility: String,
}

fn file_service(state: &AppState) -> FileService<'_> {
    FileService::new(state.db.pool(), &*state.images).with_max_upload_size(state.max_upload_size)
}

/// Read the upload form, buffering the image part to disk.
///
/// An image part with no bytes counts as no image.
async fn read_upload_form(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<(FileForm, Option<TempUpload>), ApiError> {
    let mut form = FileForm::default();
    let mut image: Option<TempUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "image" => {
                let file_name = field.file_name().map(|s| s.to_string());
                let content_type = field.content_type().map(|s| s.to_string()).or_else(|| {
                    file_name
                        .as_deref()
                        .and_then(|n| mime_guess::from_path(n).first())
                        .map(|m| m.essence_str().to_string())
                });
                let content = field.bytes().await.map_err(|e| {
                    tracing::warn!("Failed to read image content: {}", e);
                    ApiError::bad_request("Failed to read image")
                })?;

                if content.is_empty() {
                    continue;
                }

                let buffered = state
                    .uploads
                    .save(&content, file_name.as_deref(), content_type)
                    .await?;
                image = Some(buffered);
            }
            "name" | "description" | "visibility" => {
                let value = field.text().await.map_err(|e| {
                    tracing::warn!("Failed to read form field {}: {}", name, e);
                    ApiError::bad_request(format!("Invalid {} field", name))
                })?;
                match name.as_str() {
                    "name" => form.name = value,
                    "description" => form.description = Some(value),
                    _ => form.visibility = value,
                }
            }
            _ => {}
        }
    }

    Ok((form, image))
}

/// POST /api/folders/{folder_id}/files - Upload an image.
///
/// Request body: multipart/form-data with `image`, `name`, `description` and
/// `visibility` fields.
#[utoipa::path(
    post,
    path = "/api/folders/{folder_id}/files",
    tag = "files",
    params(("folder_id" = i64, Path, description = "Folder ID")),
    request_body(content = FileUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image uploaded", body = FileResponse),
        (status = 400, description = "File limit reached or malformed form"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Folder not found"),
        (status = 422, description = "Invalid fields")
    ),
    security(("session" = []))
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
    Path(folder_id): Path<i64>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponse>>), ApiError> {
    let (form, image) = read_upload_form(&state, multipart).await?;

    // The buffered image is dropped, and removed from disk, after this call
    let file = file_service(&state)
        .create(&user, folder_id, &form, image.as_ref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(FileResponse::from(file))),
    ))
}

/// GET /api/folders/{folder_id}/files/{file_id} - File with its URL.
#[utoipa::path(
    get,
    path = "/api/folders/{folder_id}/files/{file_id}",
    tag = "files",
    params(
        ("folder_id" = i64, Path, description = "Folder ID"),
        ("file_id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File with delivery URL", body = FileDetailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Folder or file not found")
    ),
    security(("session" = []))
)]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
    Path((folder_id, file_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<FileDetailResponse>>, ApiError> {
    let file = file_service(&state).get(&user, folder_id, file_id).await?;

    Ok(Json(ApiResponse::new(file.into())))
}

/// PUT /api/folders/{folder_id}/files/{file_id} - Edit a file.
#[utoipa::path(
    put,
    path = "/api/folders/{folder_id}/files/{file_id}",
    tag = "files",
    params(
        ("folder_id" = i64, Path, description = "Folder ID"),
        ("file_id" = i64, Path, description = "File ID")
    ),
    request_body = FileEditRequest,
    responses(
        (status = 200, description = "File updated", body = FileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Folder or file not found"),
        (status = 422, description = "Invalid fields")
    ),
    security(("session" = []))
)]
pub async fn update_file(
    State(state): State<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
    Path((folder_id, file_id)): Path<(i64, i64)>,
    ValidatedJson(req): ValidatedJson<FileEditRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let file = file_service(&state)
        .update(&user, folder_id, file_id, &req.into())
        .await?;

    Ok(Json(ApiResponse::new(file.into())))
}

/// DELETE /api/folders/{folder_id}/files/{file_id} - Delete a file.
#[utoipa::path(
    delete,
    path = "/api/folders/{folder_id}/files/{file_id}",
    tag = "files",
    params(
        ("folder_id" = i64, Path, description = "Folder ID"),
        ("file_id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Folder or file not found")
    ),
    security(("session" = []))
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    AuthUser { user, .. }: AuthUser,
    Path((folder_id, file_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    file_service(&state)
        .delete(&user, folder_id, file_id)
        .await?;

    Ok(Json(ApiResponse::new(MessageResponse::new("File deleted"))))
}
