//! Folder and file services for fileshare.
//!
//! This module combines the metadata repositories with the image provider:
//! - Folder listing, creation, editing and deletion
//! - File upload, lookup with a delivery URL, editing and deletion
//! - Per-user quotas and form validation

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::db::{User, VisibilityOption, VisibilityRepository};
use crate::image::{
    EditRequest, FetchRequest, ImageApi, RemoteFile, RemoveMultipleRequest, RemoveRequest,
    UploadRequest,
};
use crate::validation::{self, FieldErrors};
use crate::{FileshareError, Result};

use super::folder::{Folder, FolderRepository, FolderUpdate, NewFolder};
use super::metadata::{FileMetadata, FileRepository, FileUpdate, NewFile};
use super::storage::TempUpload;
use super::{DEFAULT_MAX_UPLOAD_SIZE, MAX_FILES_PER_USER, MAX_FOLDERS_PER_USER};

/// Submitted folder form.
#[derive(Debug, Clone, Default)]
pub struct FolderForm {
    pub name: String,
    pub description: Option<String>,
    /// Raw visibility option ID.
    pub visibility: String,
}

/// Submitted file form.
#[derive(Debug, Clone, Default)]
pub struct FileForm {
    pub name: String,
    pub description: Option<String>,
    /// Raw visibility option ID.
    pub visibility: String,
}

/// A folder with the files it contains.
#[derive(Debug, Clone)]
pub struct FolderWithFiles {
    pub folder: Folder,
    pub files: Vec<FileMetadata>,
}

/// A file with its delivery URL.
#[derive(Debug, Clone)]
pub struct FileWithUrl {
    pub file: FileMetadata,
    pub url: String,
}

/// Validated name, description and visibility shared by both forms.
struct ValidForm {
    name: String,
    description: Option<String>,
    visibility: VisibilityOption,
}

/// Check the visibility field: numeric format first, then existence.
pub(super) async fn check_visibility(
    pool: &SqlitePool,
    errors: &mut FieldErrors,
    raw: &str,
) -> Result<Option<VisibilityOption>> {
    let Some(id) = errors.check("visibility", validation::visibility_id(raw)) else {
        return Ok(None);
    };

    match VisibilityRepository::new(pool).get_by_id(id).await? {
        Some(option) => Ok(Some(option)),
        None => {
            errors.add("visibility", "Visibility option doesn't exist!");
            Ok(None)
        }
    }
}

fn finish(
    errors: FieldErrors,
    name: Option<String>,
    description: Option<Option<String>>,
    visibility: Option<VisibilityOption>,
) -> Result<ValidForm> {
    errors.into_result().map_err(FileshareError::InvalidFields)?;

    match (name, description, visibility) {
        (Some(name), Some(description), Some(visibility)) => Ok(ValidForm {
            name,
            description,
            visibility,
        }),
        _ => Err(FileshareError::Validation("incomplete form".to_string())),
    }
}

/// Folder service scoped to the folders of one owner per call.
pub struct FolderService<'a> {
    pool: &'a SqlitePool,
    images: &'a dyn ImageApi,
}

impl<'a> FolderService<'a> {
    /// Create a new FolderService.
    pub fn new(pool: &'a SqlitePool, images: &'a dyn ImageApi) -> Self {
        Self { pool, images }
    }

    /// List the user's folders.
    pub async fn list(&self, user: &User) -> Result<Vec<Folder>> {
        FolderRepository::new(self.pool).list_by_user(user.id).await
    }

    /// Get one of the user's folders.
    pub async fn get(&self, user: &User, folder_id: i64) -> Result<Folder> {
        FolderRepository::new(self.pool)
            .get_for_user(user.id, folder_id)
            .await?
            .ok_or_else(|| FileshareError::NotFound("folder".to_string()))
    }

    /// Get one of the user's folders with its files.
    pub async fn get_with_files(&self, user: &User, folder_id: i64) -> Result<FolderWithFiles> {
        let folder = self.get(user, folder_id).await?;
        let files = FileRepository::new(self.pool)
            .list_by_folder(folder.id)
            .await?;

        Ok(FolderWithFiles { folder, files })
    }

    /// Create a folder.
    ///
    /// # Limits
    /// A user owns at most [`MAX_FOLDERS_PER_USER`] folders.
    pub async fn create(&self, user: &User, form: &FolderForm) -> Result<Folder> {
        let repo = FolderRepository::new(self.pool);

        if repo.count_by_user(user.id).await? >= MAX_FOLDERS_PER_USER {
            return Err(FileshareError::LimitReached(
                "You've reached the folder limit".to_string(),
            ));
        }

        let valid = self.validate(user, form, None).await?;
        let new_folder = NewFolder::new(user.id, valid.name, valid.visibility.id)
            .with_description(valid.description);
        let folder = repo.create(&new_folder).await?;

        info!(
            user_id = user.id,
            folder_id = folder.id,
            "Folder created"
        );
        Ok(folder)
    }

    /// Edit a folder's name, description and visibility.
    pub async fn update(&self, user: &User, folder_id: i64, form: &FolderForm) -> Result<Folder> {
        let folder = self.get(user, folder_id).await?;
        let valid = self.validate(user, form, Some(folder.id)).await?;

        let update = FolderUpdate::new()
            .name(valid.name)
            .description(valid.description)
            .visibility_id(valid.visibility.id);

        FolderRepository::new(self.pool)
            .update(user.id, folder.id, &update)
            .await?
            .ok_or_else(|| FileshareError::NotFound("folder".to_string()))
    }

    /// Delete a folder: its remote images first, then the file rows and the
    /// folder row.
    ///
    /// If a remote delete fails, nothing is deleted locally. Images removed
    /// before the failure stay removed.
    pub async fn delete(&self, user: &User, folder_id: i64) -> Result<()> {
        let folder = self.get(user, folder_id).await?;
        let files = FileRepository::new(self.pool)
            .list_by_folder(folder.id)
            .await?;

        if !files.is_empty() {
            let request = RemoveMultipleRequest {
                username: user.username.clone(),
                folder_id: folder.id,
                files: files
                    .iter()
                    .map(|f| RemoteFile {
                        name: f.name.clone(),
                        visibility: f.visibility.clone(),
                    })
                    .collect(),
            };
            self.images.remove_multiple(&request).await?;
            debug!(folder_id = folder.id, count = files.len(), "Removed remote images");
        }

        FolderRepository::new(self.pool)
            .delete(user.id, folder.id)
            .await?;

        info!(user_id = user.id, folder_id = folder.id, "Folder deleted");
        Ok(())
    }

    async fn validate(
        &self,
        user: &User,
        form: &FolderForm,
        except_id: Option<i64>,
    ) -> Result<ValidForm> {
        let mut errors = FieldErrors::new();

        let name = errors.check("name", validation::folder_name(&form.name));
        if let Some(ref name) = name {
            if FolderRepository::new(self.pool)
                .name_taken(user.id, name, except_id)
                .await?
            {
                errors.add("name", format!("Folder \"{name}\" already exists"));
            }
        }
        let description = errors.check(
            "description",
            validation::description("Folder description", form.description.as_deref()),
        );
        let visibility = check_visibility(self.pool, &mut errors, &form.visibility).await?;

        finish(errors, name, description, visibility)
    }
}

/// File service for images inside a user's folders.
pub struct FileService<'a> {
    pool: &'a SqlitePool,
    images: &'a dyn ImageApi,
    max_upload_size: u64,
}

impl<'a> FileService<'a> {
    /// Create a new FileService.
    pub fn new(pool: &'a SqlitePool, images: &'a dyn ImageApi) -> Self {
        Self {
            pool,
            images,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        }
    }

    /// Set the maximum accepted image size in bytes.
    pub fn with_max_upload_size(mut self, max_size: u64) -> Self {
        self.max_upload_size = max_size;
        self
    }

    /// Upload an image and record it.
    ///
    /// # Order
    /// 1. The folder must belong to the user
    /// 2. The user must own fewer than [`MAX_FILES_PER_USER`] files
    /// 3. Form and image validation
    /// 4. Remote upload, then the metadata row
    ///
    /// The caller keeps ownership of `image` so the buffered file is removed
    /// whatever the outcome.
    pub async fn create(
        &self,
        user: &User,
        folder_id: i64,
        form: &FileForm,
        image: Option<&TempUpload>,
    ) -> Result<FileMetadata> {
        let folder = self.owned_folder(user, folder_id).await?;
        let repo = FileRepository::new(self.pool);

        if repo.count_by_user(user.id).await? >= MAX_FILES_PER_USER {
            return Err(FileshareError::LimitReached(
                "You've reached the file limit".to_string(),
            ));
        }

        let mut errors = FieldErrors::new();
        let name = self
            .check_name(&mut errors, folder.id, &form.name, None)
            .await?;
        let description = errors.check(
            "description",
            validation::description("File description", form.description.as_deref()),
        );
        let visibility = check_visibility(self.pool, &mut errors, &form.visibility).await?;
        match image {
            Some(image) => {
                errors.check(
                    "image",
                    validation::image(image.content_type(), image.size(), self.max_upload_size),
                );
            }
            None => errors.add("image", "Image must not be empty"),
        }
        let valid = finish(errors, name, description, visibility)?;
        let Some(image) = image else {
            return Err(FileshareError::Validation("missing image".to_string()));
        };

        let upload = UploadRequest {
            file_path: image.path().to_path_buf(),
            username: user.username.clone(),
            folder_id: folder.id,
            file_name: valid.name.clone(),
            file_visibility: valid.visibility.name.clone(),
        };
        let uploaded = self.images.upload(&upload).await?;
        debug!(
            public_id = %uploaded.public_id,
            mode = %uploaded.delivery_mode,
            "Image uploaded"
        );

        let new_file = NewFile::new(folder.id, valid.name, valid.visibility.id)
            .with_description(valid.description);
        let file = repo.create(&new_file).await?;

        info!(
            user_id = user.id,
            folder_id = folder.id,
            file_id = file.id,
            "File created"
        );
        Ok(file)
    }

    /// Get a file in one of the user's folders with its delivery URL.
    pub async fn get(&self, user: &User, folder_id: i64, file_id: i64) -> Result<FileWithUrl> {
        let folder = self.owned_folder(user, folder_id).await?;
        let file = self.file_in(folder.id, file_id).await?;

        let url = self
            .images
            .fetch(&FetchRequest {
                username: user.username.clone(),
                folder_id: folder.id,
                file_name: file.name.clone(),
                file_visibility: file.visibility.clone(),
            })
            .await?;

        Ok(FileWithUrl { file, url })
    }

    /// Edit a file's name, description and visibility.
    ///
    /// The remote image is only renamed when the name or visibility changed.
    pub async fn update(
        &self,
        user: &User,
        folder_id: i64,
        file_id: i64,
        form: &FileForm,
    ) -> Result<FileMetadata> {
        let folder = self.owned_folder(user, folder_id).await?;
        let file = self.file_in(folder.id, file_id).await?;

        let mut errors = FieldErrors::new();
        let name = self
            .check_name(&mut errors, folder.id, &form.name, Some(file.id))
            .await?;
        let description = errors.check(
            "description",
            validation::description("File description", form.description.as_deref()),
        );
        let visibility = check_visibility(self.pool, &mut errors, &form.visibility).await?;
        let valid = finish(errors, name, description, visibility)?;

        if valid.name != file.name || valid.visibility.name != file.visibility {
            let edit = EditRequest {
                username: user.username.clone(),
                folder_id: folder.id,
                old_name: file.name.clone(),
                new_name: valid.name.clone(),
                current_file_visibility: file.visibility.clone(),
                updated_file_visibility: valid.visibility.name.clone(),
            };
            let renamed = self.images.edit(&edit).await?;
            debug!(
                public_id = %renamed.public_id,
                mode = %renamed.delivery_mode,
                "Image renamed"
            );
        }

        let update = FileUpdate::new()
            .name(valid.name)
            .description(valid.description)
            .visibility_id(valid.visibility.id);

        FileRepository::new(self.pool)
            .update(folder.id, file.id, &update)
            .await?
            .ok_or_else(|| FileshareError::NotFound("file".to_string()))
    }

    /// Delete a file: the remote image first, then the row.
    pub async fn delete(&self, user: &User, folder_id: i64, file_id: i64) -> Result<()> {
        let folder = self.owned_folder(user, folder_id).await?;
        let file = self.file_in(folder.id, file_id).await?;

        self.images
            .remove(&RemoveRequest {
                username: user.username.clone(),
                folder_id: folder.id,
                file_name: file.name.clone(),
                file_visibility: file.visibility.clone(),
            })
            .await?;

        FileRepository::new(self.pool)
            .delete(folder.id, file.id)
            .await?;

        info!(
            user_id = user.id,
            folder_id = folder.id,
            file_id = file.id,
            "File deleted"
        );
        Ok(())
    }

    async fn owned_folder(&self, user: &User, folder_id: i64) -> Result<Folder> {
        FolderRepository::new(self.pool)
            .get_for_user(user.id, folder_id)
            .await?
            .ok_or_else(|| FileshareError::NotFound("folder".to_string()))
    }

    async fn file_in(&self, folder_id: i64, file_id: i64) -> Result<FileMetadata> {
        FileRepository::new(self.pool)
            .get_in_folder(folder_id, file_id)
            .await?
            .ok_or_else(|| FileshareError::NotFound("file".to_string()))
    }

    async fn check_name(
        &self,
        errors: &mut FieldErrors,
        folder_id: i64,
        raw: &str,
        except_id: Option<i64>,
    ) -> Result<Option<String>> {
        let name = errors.check("name", validation::file_name(raw));
        if let Some(ref name) = name {
            if FileRepository::new(self.pool)
                .name_taken(folder_id, name, except_id)
                .await?
            {
                errors.add("name", format!("File \"{name}\" already exists"));
            }
        }
        Ok(name)
    }
}
