//! Temporary upload storage for fileshare.
//!
//! Multipart image parts are buffered to disk before being handed to the
//! image provider. Each buffered file is owned by a [`TempUpload`] guard that
//! deletes it when dropped, whether or not the upload succeeded.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::Result;

/// Directory holding buffered uploads.
#[derive(Debug, Clone)]
pub struct TempStorage {
    base_path: PathBuf,
}

impl TempStorage {
    /// Create a new TempStorage with the given base path.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Write `content` to a new uniquely named file.
    ///
    /// The stored name is a random UUID followed by the sanitized original
    /// file name.
    pub async fn save(
        &self,
        content: &[u8],
        original_name: Option<&str>,
        content_type: Option<String>,
    ) -> Result<TempUpload> {
        let stored_name = Self::generate_stored_name(original_name);
        let path = self.base_path.join(stored_name);

        tokio::fs::write(&path, content).await?;
        debug!(path = %path.display(), size = content.len(), "Buffered upload");

        Ok(TempUpload {
            path,
            content_type,
            size: content.len() as u64,
        })
    }

    /// Remove every buffered file left in the directory.
    ///
    /// Returns the number of files removed.
    pub fn clear(&self) -> Result<usize> {
        let mut removed = 0;

        for entry in fs::read_dir(&self.base_path)?.flatten() {
            let path = entry.path();
            if path.is_file() && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Generate a stored name: `{uuid}-{original}` with path separators and
    /// other unsafe characters replaced.
    pub fn generate_stored_name(original_name: Option<&str>) -> String {
        let uuid = Uuid::new_v4();
        let original: String = original_name
            .and_then(|name| Path::new(name).file_name())
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{uuid}-{original}")
    }
}

/// A buffered upload on local disk, deleted on drop.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
    content_type: Option<String>,
    size: u64,
}

impl TempUpload {
    /// Path of the buffered file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Content type reported by the client.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed buffered upload"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), "Failed to remove buffered upload: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = TempStorage::new(temp_dir.path().join("uploads")).unwrap();
        (storage, temp_dir)
    }

    #[test]
    fn test_new_creates_directory() {
        let (storage, _temp) = create_test_storage();
        assert!(storage.base_path().exists());
    }

    #[tokio::test]
    async fn test_save_and_drop() {
        let (storage, _temp) = create_test_storage();

        let upload = storage
            .save(b"png bytes", Some("cat.png"), Some("image/png".to_string()))
            .await
            .unwrap();
        let path = upload.path().to_path_buf();

        assert!(path.exists());
        assert_eq!(fs::read(&path).unwrap(), b"png bytes");
        assert_eq!(upload.size(), 9);
        assert_eq!(upload.content_type(), Some("image/png"));

        drop(upload);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_drop_after_external_removal() {
        let (storage, _temp) = create_test_storage();
        let upload = storage.save(b"data", None, None).await.unwrap();

        fs::remove_file(upload.path()).unwrap();
        drop(upload);
    }

    #[test]
    fn test_generate_stored_name() {
        let name = TempStorage::generate_stored_name(Some("../../etc/my cat.png"));
        assert_eq!(name.len(), 36 + 1 + "my_cat.png".len());
        assert!(name.ends_with("-my_cat.png"));

        let fallback = TempStorage::generate_stored_name(None);
        assert!(fallback.ends_with("-upload"));
    }

    #[tokio::test]
    async fn test_clear() {
        let (storage, _temp) = create_test_storage();
        fs::write(storage.base_path().join("leftover-1"), b"a").unwrap();
        fs::write(storage.base_path().join("leftover-2"), b"b").unwrap();

        assert_eq!(storage.clear().unwrap(), 2);
        assert_eq!(storage.clear().unwrap(), 0);
    }
}
