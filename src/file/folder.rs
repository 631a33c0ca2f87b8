//! Folder types and repository for fileshare.

use sqlx::{QueryBuilder, SqlitePool};

use crate::{FileshareError, Result};

const SELECT_FOLDER: &str = "SELECT f.id, f.name, f.description, f.visibility_id,
        v.name AS visibility, f.user_id, f.created_at
     FROM folders f
     JOIN visibilities v ON v.id = f.visibility_id";

/// A folder owned by a user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Folder {
    /// Unique folder ID.
    pub id: i64,
    /// Folder name (unique per user, case-insensitive).
    pub name: String,
    /// Folder description.
    pub description: Option<String>,
    /// Visibility option ID.
    pub visibility_id: i64,
    /// Visibility label, `private` or `public`.
    pub visibility: String,
    /// Owner user ID.
    pub user_id: i64,
    /// When the folder was created.
    pub created_at: String,
}

/// Data for creating a new folder.
#[derive(Debug, Clone)]
pub struct NewFolder {
    /// Owner user ID.
    pub user_id: i64,
    /// Folder name.
    pub name: String,
    /// Folder description.
    pub description: Option<String>,
    /// Visibility option ID.
    pub visibility_id: i64,
}

impl NewFolder {
    /// Create a new NewFolder without a description.
    pub fn new(user_id: i64, name: impl Into<String>, visibility_id: i64) -> Self {
        Self {
            user_id,
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

/// Builder for updating a folder.
#[derive(Debug, Clone, Default)]
pub struct FolderUpdate {
    /// New folder name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New visibility option ID.
    pub visibility_id: Option<i64>,
}

impl FolderUpdate {
    /// Create a new FolderUpdate.
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

/// Repository for folder operations.
///
/// Lookups that take a `user_id` only see folders owned by that user.
pub struct FolderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FolderRepository<'a> {
    /// Create a new FolderRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new folder.
    pub async fn create(&self, folder: &NewFolder) -> Result<Folder> {
        let result = sqlx::query(
            "INSERT INTO folders (name, description, visibility_id, user_id) VALUES (?, ?, ?, ?)",
        )
        .bind(&folder.name)
        .bind(&folder.description)
        .bind(folder.visibility_id)
        .bind(folder.user_id)
        .execute(self.pool)
        .await
        .map_err(|e| FileshareError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| FileshareError::NotFound("folder".to_string()))
    }

    /// Get a folder by ID regardless of owner.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(&format!("{SELECT_FOLDER} WHERE f.id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| FileshareError::Database(e.to_string()))?;

        Ok(folder)
    }

    /// Get a folder owned by a user.
    pub async fn get_for_user(&self, user_id: i64, id: i64) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(&format!(
            "{SELECT_FOLDER} WHERE f.id = ? AND f.user_id = ?"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| FileshareError::Database(e.to_string()))?;

        Ok(folder)
    }

    /// List a user's folders, oldest first.
    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<Folder>> {
        let folders = sqlx::query_as::<_, Folder>(&format!(
            "{SELECT_FOLDER} WHERE f.user_id = ? ORDER BY f.id"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| FileshareError::Database(e.to_string()))?;

        Ok(folders)
    }

    /// Count a user's folders.
    pub async fn count_by_user(&self, user_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM folders WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| FileshareError::Database(e.to_string()))?;

        Ok(count)
    }

    /// Check whether the user already has a folder with this name
    /// (case-insensitive), ignoring the folder `except_id`.
    pub async fn name_taken(&self, user_id: i64, name: &str, except_id: Option<i64>) -> Result<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM folders
                WHERE user_id = ? AND name = ? COLLATE NOCASE AND id != COALESCE(?, -1)
            )",
        )
        .bind(user_id)
        .bind(name)
        .bind(except_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| FileshareError::Database(e.to_string()))?;

        Ok(taken)
    }

    /// Update a folder owned by a user.
    ///
    /// Returns `None` if the folder does not exist or belongs to someone else.
    pub async fn update(
        &self,
        user_id: i64,
        id: i64,
        update: &FolderUpdate,
    ) -> Result<Option<Folder>> {
        if update.is_empty() {
            return self.get_for_user(user_id, id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE folders SET ");
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
        query.push(" AND user_id = ");
        query.push_bind(user_id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| FileshareError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_for_user(user_id, id).await
    }

    /// Delete a folder owned by a user together with its file rows.
    pub async fn delete(&self, user_id: i64, id: i64) -> Result<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| FileshareError::Database(e.to_string()))?;

        sqlx::query(
            "DELETE FROM files WHERE folder_id = (SELECT id FROM folders WHERE id = ? AND user_id = ?)",
        )
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| FileshareError::Database(e.to_string()))?;

        let result = sqlx::query("DELETE FROM folders WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| FileshareError::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| FileshareError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
