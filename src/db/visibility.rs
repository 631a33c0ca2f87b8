//! Visibility lookup table.

use sqlx::SqlitePool;

use crate::{FileshareError, Result};

/// A row of the visibilities table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct VisibilityOption {
    pub id: i64,
    /// Label, `private` or `public`.
    pub name: String,
    pub description: String,
}

/// Repository for visibility options.
pub struct VisibilityRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> VisibilityRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all options ordered by ID.
    pub async fn list(&self) -> Result<Vec<VisibilityOption>> {
        let options = sqlx::query_as::<_, VisibilityOption>(
            "SELECT id, name, description FROM visibilities ORDER BY id",
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| FileshareError::Database(e.to_string()))?;

        Ok(options)
    }

    /// Get an option by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<VisibilityOption>> {
        let option = sqlx::query_as::<_, VisibilityOption>(
            "SELECT id, name, description FROM visibilities WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| FileshareError::Database(e.to_string()))?;

        Ok(option)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_seeded_options() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = VisibilityRepository::new(db.pool());

        let options = repo.list().await.unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].name, "private");
        assert_eq!(options[0].description, "Only you can view this folder");
        assert_eq!(options[1].name, "public");
        assert_eq!(options[1].description, "Anyone can view this folder");
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = VisibilityRepository::new(db.pool());

        assert_eq!(repo.get_by_id(2).await.unwrap().unwrap().name, "public");
        assert!(repo.get_by_id(3).await.unwrap().is_none());
    }
}
