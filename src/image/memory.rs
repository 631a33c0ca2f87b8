//! In-process image store.
//!
//! Mirrors Cloudinary's delivery semantics without network access: images
//! are keyed by public id and delivery mode, a lookup under the wrong mode
//! misses, and deleting a missing image reports not found. Used by tests and
//! local development (`image.provider = "memory"`).

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::{debug, error};

use super::adapter::{CloudinaryDataAdapter, CloudinaryRemoveData, PrepareImageData};
use super::api::{
    EditRequest, FetchRequest, ImageApi, ImageApiError, RemoveMultipleRequest, RemoveRequest,
    RenameResult, UploadRequest, UploadResult,
};
use super::visibility::DeliveryMode;

#[derive(Debug, Clone)]
struct StoredImage {
    mode: DeliveryMode,
    bytes: Vec<u8>,
}

/// Image facade backed by a process-local map.
#[derive(Default)]
pub struct MemoryImageApi {
    adapter: CloudinaryDataAdapter,
    images: Mutex<HashMap<String, StoredImage>>,
    failing: Mutex<HashSet<String>>,
    removal_attempts: Mutex<Vec<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryImageApi {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an image directly, bypassing upload.
    pub fn insert(&self, public_id: impl Into<String>, mode: DeliveryMode) {
        lock(&self.images).insert(
            public_id.into(),
            StoredImage {
                mode,
                bytes: Vec::new(),
            },
        );
    }

    /// Make every later call touching `public_id` fail.
    pub fn fail_on(&self, public_id: impl Into<String>) {
        lock(&self.failing).insert(public_id.into());
    }

    /// Whether an image is stored under `public_id`.
    pub fn contains(&self, public_id: &str) -> bool {
        lock(&self.images).contains_key(public_id)
    }

    /// Delivery mode of a stored image.
    pub fn mode_of(&self, public_id: &str) -> Option<DeliveryMode> {
        lock(&self.images).get(public_id).map(|image| image.mode)
    }

    /// Stored bytes of an image.
    pub fn bytes_of(&self, public_id: &str) -> Option<Vec<u8>> {
        lock(&self.images)
            .get(public_id)
            .map(|image| image.bytes.clone())
    }

    /// Number of stored images.
    pub fn len(&self) -> usize {
        lock(&self.images).len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Public ids passed to delete operations, in call order.
    pub fn removal_attempts(&self) -> Vec<String> {
        lock(&self.removal_attempts).clone()
    }

    fn is_failing(&self, public_id: &str) -> bool {
        lock(&self.failing).contains(public_id)
    }

    fn destroy(&self, data: &CloudinaryRemoveData) -> Result<(), ImageApiError> {
        let public_id = data.public_id();
        lock(&self.removal_attempts).push(public_id.clone());

        if self.is_failing(&public_id) {
            error!(public_id = %public_id, "Injected remove failure");
            return Err(ImageApiError::Remove);
        }

        let mut images = lock(&self.images);
        match images.get(&public_id) {
            Some(image) if image.mode == data.upload_type => {
                images.remove(&public_id);
                debug!(public_id = %public_id, "Image removed");
                Ok(())
            }
            _ => Err(ImageApiError::NotFound),
        }
    }
}

#[async_trait]
impl ImageApi for MemoryImageApi {
    async fn fetch(&self, request: &FetchRequest) -> Result<String, ImageApiError> {
        let data = self.adapter.prepare_fetch_data(request);
        let public_id = data.public_id();

        if self.is_failing(&public_id) {
            error!(public_id = %public_id, "Injected fetch failure");
            return Err(ImageApiError::Fetch);
        }

        match lock(&self.images).get(&public_id) {
            Some(image) if image.mode == data.upload_type => {
                Ok(format!("memory://{}/{}", data.upload_type, public_id))
            }
            _ => Err(ImageApiError::NotFound),
        }
    }

    async fn upload(&self, request: &UploadRequest) -> Result<UploadResult, ImageApiError> {
        let data = self.adapter.prepare_upload_data(request);
        let public_id = data.public_id();
        let mode = data.delivery_mode();

        if self.is_failing(&public_id) {
            error!(public_id = %public_id, "Injected upload failure");
            return Err(ImageApiError::Upload);
        }

        let bytes = tokio::fs::read(&data.file_path).await.map_err(|e| {
            error!(path = %data.file_path.display(), error = %e, "Failed to read upload buffer");
            ImageApiError::Upload
        })?;
        let size = bytes.len() as u64;

        lock(&self.images).insert(public_id.clone(), StoredImage { mode, bytes });

        Ok(UploadResult {
            secure_url: Some(format!("memory://{mode}/{public_id}")),
            public_id,
            delivery_mode: mode,
            bytes: Some(size),
        })
    }

    async fn edit(&self, request: &EditRequest) -> Result<RenameResult, ImageApiError> {
        let data = self.adapter.prepare_edit_data(request);
        let from_public_id = data.from_public_id();
        let to_public_id = data.to_public_id();

        if self.is_failing(&from_public_id) {
            error!(public_id = %from_public_id, "Injected edit failure");
            return Err(ImageApiError::Edit);
        }

        let mut images = lock(&self.images);
        let current = match images.get(&from_public_id) {
            Some(image) if image.mode == data.current_type => image.clone(),
            _ => {
                error!(public_id = %from_public_id, "Rename source not found");
                return Err(ImageApiError::Edit);
            }
        };

        if from_public_id != to_public_id && images.contains_key(&to_public_id) {
            error!(public_id = %to_public_id, "Rename target already exists");
            return Err(ImageApiError::Edit);
        }

        images.remove(&from_public_id);
        images.insert(
            to_public_id.clone(),
            StoredImage {
                mode: data.updated_type,
                bytes: current.bytes,
            },
        );

        Ok(RenameResult {
            public_id: to_public_id,
            delivery_mode: data.updated_type,
        })
    }

    async fn remove(&self, request: &RemoveRequest) -> Result<(), ImageApiError> {
        let data = self.adapter.prepare_remove_data(request);
        self.destroy(&data)
    }

    async fn remove_multiple(
        &self,
        request: &RemoveMultipleRequest,
    ) -> Result<bool, ImageApiError> {
        let data = self.adapter.prepare_remove_multiple_data(request);
        for removal in data.removals() {
            self.destroy(&removal)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remove(name: &str, visibility: &str) -> RemoveRequest {
        RemoveRequest {
            username: "alice".to_string(),
            folder_id: 7,
            file_name: name.to_string(),
            file_visibility: visibility.to_string(),
        }
    }

    #[tokio::test]
    async fn test_remove_existing() {
        let api = MemoryImageApi::new();
        api.insert("alice-7-cat", DeliveryMode::Upload);

        api.remove(&remove("cat", "public")).await.unwrap();
        assert!(!api.contains("alice-7-cat"));
        assert_eq!(api.removal_attempts(), vec!["alice-7-cat".to_string()]);
    }

    #[tokio::test]
    async fn test_remove_missing_is_not_found() {
        let api = MemoryImageApi::new();
        let err = api.remove(&remove("cat", "public")).await.unwrap_err();
        assert_eq!(err, ImageApiError::NotFound);
    }

    #[tokio::test]
    async fn test_remove_wrong_mode_is_not_found() {
        let api = MemoryImageApi::new();
        api.insert("alice-7-cat", DeliveryMode::Authenticated);

        let err = api.remove(&remove("cat", "public")).await.unwrap_err();
        assert_eq!(err, ImageApiError::NotFound);
        assert!(api.contains("alice-7-cat"));
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let api = MemoryImageApi::new();
        api.insert("alice-7-cat", DeliveryMode::Upload);
        api.fail_on("alice-7-cat");

        let err = api.remove(&remove("cat", "public")).await.unwrap_err();
        assert_eq!(err, ImageApiError::Remove);
        assert!(api.contains("alice-7-cat"));
    }

    #[tokio::test]
    async fn test_fetch_url() {
        let api = MemoryImageApi::new();
        api.insert("alice-7-cat", DeliveryMode::Authenticated);

        let url = api
            .fetch(&FetchRequest {
                username: "alice".to_string(),
                folder_id: 7,
                file_name: "cat".to_string(),
                file_visibility: "private".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(url, "memory://authenticated/alice-7-cat");
    }
}
