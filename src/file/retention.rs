//! Retention sweep.
//!
//! Deletes files older than a configured age: every remote image is removed
//! concurrently and each outcome is logged on its own, then all selected rows
//! are deleted in one statement.

use futures::future::join_all;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::image::{ImageApi, RemoveRequest};
use crate::Result;

use super::metadata::FileRepository;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Files selected for deletion.
    pub selected: usize,
    /// Remote deletes that succeeded.
    pub removed: usize,
    /// Remote deletes that failed.
    pub failed: usize,
    /// Metadata rows deleted.
    pub deleted_rows: u64,
}

/// Remove every file uploaded more than `max_age_days` days ago.
///
/// Remote failures do not stop the sweep and do not keep their rows.
pub async fn sweep(pool: &SqlitePool, images: &dyn ImageApi, max_age_days: u32) -> Result<SweepReport> {
    let repo = FileRepository::new(pool);
    let expired = repo.list_older_than(max_age_days).await?;

    if expired.is_empty() {
        debug!("Retention sweep: nothing to delete");
        return Ok(SweepReport::default());
    }

    let requests: Vec<RemoveRequest> = expired
        .iter()
        .map(|f| RemoveRequest {
            username: f.username.clone(),
            folder_id: f.folder_id,
            file_name: f.name.clone(),
            file_visibility: f.visibility.clone(),
        })
        .collect();
    let outcomes = join_all(requests.iter().map(|r| images.remove(r))).await;

    let mut report = SweepReport {
        selected: expired.len(),
        ..SweepReport::default()
    };
    for (file, outcome) in expired.iter().zip(outcomes) {
        match outcome {
            Ok(()) => report.removed += 1,
            Err(e) => {
                report.failed += 1;
                warn!(
                    file_id = file.id,
                    username = %file.username,
                    folder_id = file.folder_id,
                    name = %file.name,
                    "Retention sweep could not remove image: {}",
                    e
                );
            }
        }
    }

    let ids: Vec<i64> = expired.iter().map(|f| f.id).collect();
    report.deleted_rows = repo.delete_many(&ids).await?;

    info!(
        selected = report.selected,
        removed = report.removed,
        failed = report.failed,
        deleted_rows = report.deleted_rows,
        "Retention sweep complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::file::{FolderRepository, NewFile, NewFolder};
    use crate::image::{DeliveryMode, MemoryImageApi};
    use crate::Database;

    async fn setup() -> (Database, MemoryImageApi) {
        let db = Database::open_in_memory().await.unwrap();
        UserRepository::new(db.pool())
            .create(&NewUser::new("alice", "Alice", "hash"))
            .await
            .unwrap();
        FolderRepository::new(db.pool())
            .create(&NewFolder::new(1, "Pets", 2))
            .await
            .unwrap();

        let files = FileRepository::new(db.pool());
        files.create(&NewFile::new(1, "cat", 2)).await.unwrap();
        files.create(&NewFile::new(1, "dog", 1)).await.unwrap();
        files.create(&NewFile::new(1, "fresh", 2)).await.unwrap();
        sqlx::query("UPDATE files SET created_at = datetime('now', '-4 days') WHERE name != 'fresh'")
            .execute(db.pool())
            .await
            .unwrap();

        let images = MemoryImageApi::new();
        images.insert("alice-1-cat", DeliveryMode::Upload);
        images.insert("alice-1-dog", DeliveryMode::Authenticated);
        images.insert("alice-1-fresh", DeliveryMode::Upload);
        (db, images)
    }

    #[tokio::test]
    async fn test_sweep_removes_old_files() {
        let (db, images) = setup().await;

        let report = sweep(db.pool(), &images, 3).await.unwrap();
        assert_eq!(
            report,
            SweepReport {
                selected: 2,
                removed: 2,
                failed: 0,
                deleted_rows: 2,
            }
        );
        assert!(!images.contains("alice-1-cat"));
        assert!(!images.contains("alice-1-dog"));
        assert!(images.contains("alice-1-fresh"));

        let left = FileRepository::new(db.pool()).list_by_folder(1).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].name, "fresh");
    }

    #[tokio::test]
    async fn test_sweep_attempts_all_and_deletes_rows_despite_failures() {
        let (db, images) = setup().await;
        images.fail_on("alice-1-cat");

        let report = sweep(db.pool(), &images, 3).await.unwrap();
        assert_eq!(report.removed, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.deleted_rows, 2);

        let mut attempts = images.removal_attempts();
        attempts.sort();
        assert_eq!(attempts, ["alice-1-cat", "alice-1-dog"]);
    }

    #[tokio::test]
    async fn test_sweep_with_nothing_expired() {
        let (db, images) = setup().await;

        let report = sweep(db.pool(), &images, 30).await.unwrap();
        assert_eq!(report, SweepReport::default());
        assert!(images.removal_attempts().is_empty());
    }
}
