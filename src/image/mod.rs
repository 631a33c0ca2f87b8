//! Remote image storage.
//!
//! The rest of the application reaches the image CDN only through the
//! [`ImageApi`] trait. Requests carry domain visibility labels; each provider
//! converts them to its own request shapes through a [`PrepareImageData`]
//! adapter and derives the remote identifier with [`build_id`].

mod adapter;
mod api;
mod cloudinary;
mod identifier;
mod memory;
mod visibility;

pub use adapter::{
    CloudinaryDataAdapter, CloudinaryEditData, CloudinaryFetchData, CloudinaryRemoteFile,
    CloudinaryRemoveData, CloudinaryRemoveMultipleData, CloudinaryUploadData, PrepareImageData,
};
pub use api::{
    EditRequest, FetchRequest, ImageApi, ImageApiError, RemoteFile, RemoveMultipleRequest,
    RemoveRequest, RenameResult, UploadRequest, UploadResult,
};
pub use cloudinary::{CloudinaryApi, SignatureAlgorithm};
pub use identifier::build_id;
pub use memory::MemoryImageApi;
pub use visibility::{delivery_mode, DeliveryMode, Visibility, PRIVATE, PUBLIC};

use std::sync::Arc;

use tracing::info;

use crate::config::ImageConfig;
use crate::{FileshareError, Result};

/// Shared handle to the configured image provider.
pub type SharedImageApi = Arc<dyn ImageApi>;

/// Construct the provider selected by `config.provider`.
pub fn create_image_api(config: &ImageConfig) -> Result<SharedImageApi> {
    match config.provider.as_str() {
        "cloudinary" => {
            info!(cloud = %config.cloud_name, "Using Cloudinary image provider");
            Ok(Arc::new(CloudinaryApi::new(config)?))
        }
        "memory" => {
            info!("Using in-memory image provider");
            Ok(Arc::new(MemoryImageApi::new()))
        }
        other => Err(FileshareError::Config(format!(
            "unknown image provider: {other}"
        ))),
    }
}
