//! Public share links.
//!
//! Anyone may view a public folder (listing its public files only) or a
//! public file. Private items are reported as not found.

use sqlx::SqlitePool;

use crate::image::{FetchRequest, ImageApi, PUBLIC};
use crate::{FileshareError, Result};

use super::folder::FolderRepository;
use super::metadata::{FileRepository, OwnedFile};
use super::service::FolderWithFiles;

/// A shared file with its owner and delivery URL.
#[derive(Debug, Clone)]
pub struct SharedFile {
    pub file: OwnedFile,
    pub url: String,
}

/// Read-only access to public folders and files.
pub struct ShareService<'a> {
    pool: &'a SqlitePool,
    images: &'a dyn ImageApi,
}

impl<'a> ShareService<'a> {
    pub fn new(pool: &'a SqlitePool, images: &'a dyn ImageApi) -> Self {
        Self { pool, images }
    }

    /// Get a public folder and its public files.
    pub async fn folder(&self, folder_id: i64) -> Result<FolderWithFiles> {
        let folder = FolderRepository::new(self.pool)
            .get_by_id(folder_id)
            .await?
            .filter(|f| f.visibility == PUBLIC)
            .ok_or_else(|| FileshareError::NotFound("folder".to_string()))?;

        let files = FileRepository::new(self.pool)
            .list_by_folder(folder.id)
            .await?
            .into_iter()
            .filter(|f| f.visibility == PUBLIC)
            .collect();

        Ok(FolderWithFiles { folder, files })
    }

    /// Get a public file with its delivery URL.
    pub async fn file(&self, file_id: i64) -> Result<SharedFile> {
        let file = FileRepository::new(self.pool)
            .get_owned(file_id)
            .await?
            .filter(|f| f.visibility == PUBLIC)
            .ok_or_else(|| FileshareError::NotFound("file".to_string()))?;

        let url = self
            .images
            .fetch(&FetchRequest {
                username: file.username.clone(),
                folder_id: file.folder_id,
                file_name: file.name.clone(),
                file_visibility: file.visibility.clone(),
            })
            .await?;

        Ok(SharedFile { file, url })
    }
}
