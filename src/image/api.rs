//! The image facade: vendor-agnostic requests and the `ImageApi` trait.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use super::visibility::DeliveryMode;

/// Errors surfaced by an image provider.
///
/// Messages are fixed; provider detail is logged where it occurs and never
/// carried to callers.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageApiError {
    /// The delivery URL could not be built.
    #[error("Couldn't create URL!")]
    Fetch,

    /// The upload was rejected or failed.
    #[error("Couldn't upload file!")]
    Upload,

    /// The rename failed.
    #[error("Couldn't edit image!")]
    Edit,

    /// The delete failed.
    #[error("Couldn't delete image!")]
    Remove,

    /// The image does not exist at the provider.
    #[error("Image not found!")]
    NotFound,
}

/// Request for a delivery URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub username: String,
    pub folder_id: i64,
    pub file_name: String,
    pub file_visibility: String,
}

/// Request to upload a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Path of the buffered upload on local disk.
    pub file_path: PathBuf,
    pub username: String,
    pub folder_id: i64,
    pub file_name: String,
    pub file_visibility: String,
}

/// Request to rename an image and/or move it between visibilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub username: String,
    pub folder_id: i64,
    pub old_name: String,
    pub new_name: String,
    pub current_file_visibility: String,
    pub updated_file_visibility: String,
}

/// Request to delete one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveRequest {
    pub username: String,
    pub folder_id: i64,
    pub file_name: String,
    pub file_visibility: String,
}

/// A file entry in a bulk delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub name: String,
    pub visibility: String,
}

/// Request to delete every listed image of a folder, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveMultipleRequest {
    pub username: String,
    pub folder_id: i64,
    pub files: Vec<RemoteFile>,
}

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub public_id: String,
    pub delivery_mode: DeliveryMode,
    /// Provider URL of the stored original, when reported.
    pub secure_url: Option<String>,
    /// Stored size in bytes, when reported.
    pub bytes: Option<u64>,
}

/// Outcome of a successful rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameResult {
    pub public_id: String,
    pub delivery_mode: DeliveryMode,
}

/// Operations on remotely stored images.
///
/// Implementations derive the remote identifier from each request and keep
/// no per-image state of their own.
#[async_trait]
pub trait ImageApi: Send + Sync {
    /// Build a signed delivery URL for an image.
    async fn fetch(&self, request: &FetchRequest) -> Result<String, ImageApiError>;

    /// Upload the file at `request.file_path`.
    async fn upload(&self, request: &UploadRequest) -> Result<UploadResult, ImageApiError>;

    /// Rename an image, moving it between delivery modes when they differ.
    async fn edit(&self, request: &EditRequest) -> Result<RenameResult, ImageApiError>;

    /// Delete an image. A missing image is an error.
    async fn remove(&self, request: &RemoveRequest) -> Result<(), ImageApiError>;

    /// Delete images one after another, stopping at the first failure.
    ///
    /// Images deleted before the failure stay deleted.
    async fn remove_multiple(&self, request: &RemoveMultipleRequest)
        -> Result<bool, ImageApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_fixed() {
        assert_eq!(ImageApiError::Fetch.to_string(), "Couldn't create URL!");
        assert_eq!(ImageApiError::Upload.to_string(), "Couldn't upload file!");
        assert_eq!(ImageApiError::Edit.to_string(), "Couldn't edit image!");
        assert_eq!(ImageApiError::Remove.to_string(), "Couldn't delete image!");
        assert_eq!(ImageApiError::NotFound.to_string(), "Image not found!");
    }

    #[test]
    fn test_not_found_is_distinct_from_remove() {
        assert_ne!(ImageApiError::NotFound, ImageApiError::Remove);
    }
}
