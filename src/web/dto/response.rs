//! Response DTOs for Web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::db::{User, VisibilityOption};
use crate::file::{FileMetadata, FileWithUrl, Folder, FolderWithFiles, SharedFile};

// ============================================================================
// Generic Response Wrappers
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Simple confirmation message.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Auth
// ============================================================================

/// Login response.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Session token, also set as the `session` cookie.
    pub token: String,
    /// Session lifetime in seconds.
    pub expires_in: u64,
    /// User information.
    pub user: UserInfo,
}

/// User information in responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfo {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Account creation time.
    pub created_at: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            created_at: user.created_at,
        }
    }
}

// ============================================================================
// Visibility
// ============================================================================

/// Visibility option.
#[derive(Debug, Serialize, ToSchema)]
pub struct VisibilityResponse {
    pub id: i64,
    /// Label: `private` or `public`.
    pub name: String,
    pub description: String,
}

impl From<VisibilityOption> for VisibilityResponse {
    fn from(option: VisibilityOption) -> Self {
        Self {
            id: option.id,
            name: option.name,
            description: option.description,
        }
    }
}

// ============================================================================
// Folders and files
// ============================================================================

/// Folder summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct FolderResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub visibility_id: i64,
    /// Visibility label.
    pub visibility: String,
    pub created_at: String,
}

impl From<Folder> for FolderResponse {
    fn from(folder: Folder) -> Self {
        Self {
            id: folder.id,
            name: folder.name,
            description: folder.description,
            visibility_id: folder.visibility_id,
            visibility: folder.visibility,
            created_at: folder.created_at,
        }
    }
}

/// File metadata.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub visibility_id: i64,
    /// Visibility label.
    pub visibility: String,
    pub folder_id: i64,
    pub created_at: String,
}

impl From<FileMetadata> for FileResponse {
    fn from(file: FileMetadata) -> Self {
        Self {
            id: file.id,
            name: file.name,
            description: file.description,
            visibility_id: file.visibility_id,
            visibility: file.visibility,
            folder_id: file.folder_id,
            created_at: file.created_at,
        }
    }
}

/// Folder with its files.
#[derive(Debug, Serialize, ToSchema)]
pub struct FolderDetailResponse {
    pub folder: FolderResponse,
    pub files: Vec<FileResponse>,
}

impl From<FolderWithFiles> for FolderDetailResponse {
    fn from(value: FolderWithFiles) -> Self {
        Self {
            folder: value.folder.into(),
            files: value.files.into_iter().map(FileResponse::from).collect(),
        }
    }
}

/// File with its delivery URL.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileDetailResponse {
    pub file: FileResponse,
    /// Image delivery URL.
    pub url: String,
}

impl From<FileWithUrl> for FileDetailResponse {
    fn from(value: FileWithUrl) -> Self {
        Self {
            file: value.file.into(),
            url: value.url,
        }
    }
}

// ============================================================================
// Share
// ============================================================================

/// Publicly shared file.
#[derive(Debug, Serialize, ToSchema)]
pub struct SharedFileResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub folder_id: i64,
    /// Owner's username.
    pub owner: String,
    /// Image delivery URL.
    pub url: String,
    pub created_at: String,
}

impl From<SharedFile> for SharedFileResponse {
    fn from(shared: SharedFile) -> Self {
        Self {
            id: shared.file.id,
            name: shared.file.name,
            description: shared.file.description,
            folder_id: shared.file.folder_id,
            owner: shared.file.username,
            url: shared.url,
            created_at: shared.file.created_at,
        }
    }
}
