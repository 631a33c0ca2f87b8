//! File metadata types and repository for fileshare.
//!
//! Image bytes live with the image provider; these rows only hold the names
//! and settings needed to address them.

use sqlx::{QueryBuilder, SqlitePool};

use crate::{FileshareError, Result};

const SELECT_FILE: &str = "SELECT f.id, f.name, f.description, f.visibility_id,
        v.name AS visibility, f.folder_id, f.created_at
     FROM files f
     JOIN visibilities v ON v.id = f.visibility_id";

/// Maximum IDs bound into a single `DELETE ... IN (...)` statement.
pub const DELETE_CHUNK_SIZE: usize = 500;

/// Metadata for an uploaded image.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FileMetadata {
    /// Unique file ID.
    pub id: i64,
    /// File name (unique within its folder).
    pub name: String,
    /// File description.
    pub description: Option<String>,
    /// Visibility option ID.
    pub visibility_id: i64,
    /// Visibility label, `private` or `public`.
    pub visibility: String,
    /// Folder ID this file belongs to.
    pub folder_id: i64,
    /// When the file was uploaded.
    pub created_at: String,
}

/// A file together with its owner, as needed to address the remote image.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OwnedFile {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub visibility: String,
    pub folder_id: i64,
    /// Owner's username.
    pub username: String,
    pub created_at: String,
}

/// Data for creating a new file entry.
#[derive(Debug, Clone)]
pub struct NewFile {
    /// Folder ID this file belongs to.
    pub folder_id: i64,
    /// File name.
    pub name: String,
    /// File description.
    pub description: Option<String>,
    /// Visibility option ID.
    pub visibility_id: i64,
}

impl NewFile {
    /// Create a new NewFile.
    pub fn new(folder_id: i64, name: impl Into<String>, visibility_id: i64) -> Self {
        Self {
            folder_id,
            name: name.into(),
            description: None,
            visibility_id,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: Option<impl Into<String>>) -> Self {
        self.description = description.map(|s| s.into());
        self
    }
}

/// Builder for updating file metadata.
#[derive(Debug, Clone, Default)]
pub struct FileUpdate {
    /// New file name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New visibility option ID.
    pub visibility_id: Option<i64>,
}

impl FileUpdate {
    /// Create a new FileUpdate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description.
    pub fn description(mut self, description: Option<impl Into<String>>) -> Self {
        self.description = Some(description.map(|s| s.into()));
        self
    }

    /// Set the visibility option ID.
    pub fn visibility_id(mut self, visibility_id: i64) -> Self {
        self.visibility_id = Some(visibility_id);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.visibility_id.is_none()
    }
}

/// Repository for file metadata operations.
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new file entry.
    pub async fn create(&self, file: &NewFile) -> Result<FileMetadata> {
        let result = sqlx::query(
            "INSERT INTO files (name, description, visibility_id, folder_id) VALUES (?, ?, ?, ?)",
        )
        .bind(&file.name)
        .bind(&file.description)
        .bind(file.visibility_id)
        .bind(file.folder_id)
        .execute(self.pool)
        .await
        .map_err(|e| FileshareError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| FileshareError::NotFound("file".to_string()))
    }

    /// Get a file by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<FileMetadata>> {
        let file = sqlx::query_as::<_, FileMetadata>(&format!("{SELECT_FILE} WHERE f.id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| FileshareError::Database(e.to_string()))?;

        Ok(file)
    }

    /// Get a file by ID, only if it lives in the given folder.
    pub async fn get_in_folder(&self, folder_id: i64, id: i64) -> Result<Option<FileMetadata>> {
        let file = sqlx::query_as::<_, FileMetadata>(&format!(
            "{SELECT_FILE} WHERE f.id = ? AND f.folder_id = ?"
        ))
        .bind(id)
        .bind(folder_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| FileshareError::Database(e.to_string()))?;

        Ok(file)
    }

    /// List files in a folder, oldest first.
    pub async fn list_by_folder(&self, folder_id: i64) -> Result<Vec<FileMetadata>> {
        let files = sqlx::query_as::<_, FileMetadata>(&format!(
            "{SELECT_FILE} WHERE f.folder_id = ? ORDER BY f.id"
        ))
        .bind(folder_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| FileshareError::Database(e.to_string()))?;

        Ok(files)
    }

    /// Count files across all folders owned by a user.
    pub async fn count_by_user(&self, user_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM files f JOIN folders d ON d.id = f.folder_id WHERE d.user_id = ?",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| FileshareError::Database(e.to_string()))?;

        Ok(count)
    }

    /// Check whether a folder already holds a file with this name, ignoring
    /// the file `except_id`.
    pub async fn name_taken(&self, folder_id: i64, name: &str, except_id: Option<i64>) -> Result<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM files WHERE folder_id = ? AND name = ? AND id != COALESCE(?, -1)
            )",
        )
        .bind(folder_id)
        .bind(name)
        .bind(except_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| FileshareError::Database(e.to_string()))?;

        Ok(taken)
    }

    /// Get a file with its owner's username.
    pub async fn get_owned(&self, id: i64) -> Result<Option<OwnedFile>> {
        let file = sqlx::query_as::<_, OwnedFile>(
            "SELECT f.id, f.name, f.description, v.name AS visibility, f.folder_id,
                    u.username, f.created_at
             FROM files f
             JOIN visibilities v ON v.id = f.visibility_id
             JOIN folders d ON d.id = f.folder_id
             JOIN users u ON u.id = d.user_id
             WHERE f.id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| FileshareError::Database(e.to_string()))?;

        Ok(file)
    }

    /// List files uploaded more than `days` days ago, with their owners.
    pub async fn list_older_than(&self, days: u32) -> Result<Vec<OwnedFile>> {
        let files = sqlx::query_as::<_, OwnedFile>(
            "SELECT f.id, f.name, f.description, v.name AS visibility, f.folder_id,
                    u.username, f.created_at
             FROM files f
             JOIN visibilities v ON v.id = f.visibility_id
             JOIN folders d ON d.id = f.folder_id
             JOIN users u ON u.id = d.user_id
             WHERE f.created_at < datetime('now', ?)
             ORDER BY f.id",
        )
        .bind(format!("-{days} days"))
        .fetch_all(self.pool)
        .await
        .map_err(|e| FileshareError::Database(e.to_string()))?;

        Ok(files)
    }

    /// Update a file in the given folder.
    ///
    /// Returns `None` if no such file exists in that folder.
    pub async fn update(
        &self,
        folder_id: i64,
        id: i64,
        update: &FileUpdate,
    ) -> Result<Option<FileMetadata>> {
        if update.is_empty() {
            return self.get_in_folder(folder_id, id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE files SET ");
        let mut separated = query.separated(", ");

        if let Some(ref name) = update.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name.clone());
        }

        if let Some(ref description) = update.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description.clone());
        }

        if let Some(visibility_id) = update.visibility_id {
            separated.push("visibility_id = ");
            separated.push_bind_unseparated(visibility_id);
        }

        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(" AND folder_id = ");
        query.push_bind(folder_id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| FileshareError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_in_folder(folder_id, id).await
    }

    /// Delete a file in the given folder.
    pub async fn delete(&self, folder_id: i64, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ? AND folder_id = ?")
            .bind(id)
            .bind(folder_id)
            .execute(self.pool)
            .await
            .map_err(|e| FileshareError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete many files by ID, returning how many rows were removed.
    ///
    /// IDs are bound in chunks of [`DELETE_CHUNK_SIZE`] inside one transaction.
    pub async fn delete_many(&self, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| FileshareError::Database(e.to_string()))?;

        let mut deleted = 0;
        for chunk in ids.chunks(DELETE_CHUNK_SIZE) {
            let mut query: QueryBuilder<sqlx::Sqlite> =
                QueryBuilder::new("DELETE FROM files WHERE id IN (");
            let mut separated = query.separated(", ");
            for id in chunk {
                separated.push_bind(*id);
            }
            separated.push_unseparated(")");

            let result = query
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| FileshareError::Database(e.to_string()))?;
            deleted += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| FileshareError::Database(e.to_string()))?;

        Ok(deleted)
    }
}
