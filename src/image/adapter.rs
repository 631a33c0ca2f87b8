//! Conversion of facade requests into vendor request shapes.

use std::path::PathBuf;

use super::api::{EditRequest, FetchRequest, RemoveMultipleRequest, RemoveRequest, UploadRequest};
use super::identifier::build_id;
use super::visibility::{delivery_mode, DeliveryMode, PRIVATE};

/// Per-vendor translation of facade requests.
///
/// Every method is a pure transform; no I/O happens here.
pub trait PrepareImageData {
    type Fetch;
    type Upload;
    type Edit;
    type Remove;
    type RemoveMultiple;

    fn prepare_fetch_data(&self, data: &FetchRequest) -> Self::Fetch;
    fn prepare_upload_data(&self, data: &UploadRequest) -> Self::Upload;
    fn prepare_edit_data(&self, data: &EditRequest) -> Self::Edit;
    fn prepare_remove_data(&self, data: &RemoveRequest) -> Self::Remove;
    fn prepare_remove_multiple_data(&self, data: &RemoveMultipleRequest) -> Self::RemoveMultiple;
}

/// Cloudinary fetch parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudinaryFetchData {
    pub username: String,
    pub folder_id: i64,
    pub file_name: String,
    pub upload_type: DeliveryMode,
}

impl CloudinaryFetchData {
    pub fn public_id(&self) -> String {
        build_id(&self.username, self.folder_id, &self.file_name)
    }
}

/// Cloudinary upload parameters.
///
/// Upload takes an `authenticated` flag instead of a delivery type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudinaryUploadData {
    pub file_path: PathBuf,
    pub username: String,
    pub folder_id: i64,
    pub file_name: String,
    pub authenticated: bool,
}

impl CloudinaryUploadData {
    pub fn public_id(&self) -> String {
        build_id(&self.username, self.folder_id, &self.file_name)
    }

    pub fn delivery_mode(&self) -> DeliveryMode {
        if self.authenticated {
            DeliveryMode::Authenticated
        } else {
            DeliveryMode::Upload
        }
    }
}

/// Cloudinary rename parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudinaryEditData {
    pub username: String,
    pub folder_id: i64,
    pub old_name: String,
    pub new_name: String,
    pub current_type: DeliveryMode,
    pub updated_type: DeliveryMode,
}

impl CloudinaryEditData {
    pub fn from_public_id(&self) -> String {
        build_id(&self.username, self.folder_id, &self.old_name)
    }

    pub fn to_public_id(&self) -> String {
        build_id(&self.username, self.folder_id, &self.new_name)
    }
}

/// Cloudinary destroy parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudinaryRemoveData {
    pub username: String,
    pub folder_id: i64,
    pub file_name: String,
    pub upload_type: DeliveryMode,
}

impl CloudinaryRemoveData {
    pub fn public_id(&self) -> String {
        build_id(&self.username, self.folder_id, &self.file_name)
    }
}

/// A file entry of a Cloudinary bulk delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudinaryRemoteFile {
    pub name: String,
    pub upload_type: DeliveryMode,
}

/// Cloudinary bulk destroy parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudinaryRemoveMultipleData {
    pub username: String,
    pub folder_id: i64,
    pub files: Vec<CloudinaryRemoteFile>,
}

impl CloudinaryRemoveMultipleData {
    /// Single-destroy parameters for each file, in request order.
    pub fn removals(&self) -> impl Iterator<Item = CloudinaryRemoveData> + '_ {
        self.files.iter().map(|file| CloudinaryRemoveData {
            username: self.username.clone(),
            folder_id: self.folder_id,
            file_name: file.name.clone(),
            upload_type: file.upload_type,
        })
    }
}

/// Request adapter for Cloudinary.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloudinaryDataAdapter;

impl PrepareImageData for CloudinaryDataAdapter {
    type Fetch = CloudinaryFetchData;
    type Upload = CloudinaryUploadData;
    type Edit = CloudinaryEditData;
    type Remove = CloudinaryRemoveData;
    type RemoveMultiple = CloudinaryRemoveMultipleData;

    fn prepare_fetch_data(&self, data: &FetchRequest) -> CloudinaryFetchData {
        CloudinaryFetchData {
            username: data.username.clone(),
            folder_id: data.folder_id,
            file_name: data.file_name.clone(),
            upload_type: delivery_mode(&data.file_visibility),
        }
    }

    fn prepare_upload_data(&self, data: &UploadRequest) -> CloudinaryUploadData {
        CloudinaryUploadData {
            file_path: data.file_path.clone(),
            username: data.username.clone(),
            folder_id: data.folder_id,
            file_name: data.file_name.clone(),
            authenticated: data.file_visibility == PRIVATE,
        }
    }

    fn prepare_edit_data(&self, data: &EditRequest) -> CloudinaryEditData {
        CloudinaryEditData {
            username: data.username.clone(),
            folder_id: data.folder_id,
            old_name: data.old_name.clone(),
            new_name: data.new_name.clone(),
            current_type: delivery_mode(&data.current_file_visibility),
            updated_type: delivery_mode(&data.updated_file_visibility),
        }
    }

    fn prepare_remove_data(&self, data: &RemoveRequest) -> CloudinaryRemoveData {
        CloudinaryRemoveData {
            username: data.username.clone(),
            folder_id: data.folder_id,
            file_name: data.file_name.clone(),
            upload_type: delivery_mode(&data.file_visibility),
        }
    }

    fn prepare_remove_multiple_data(
        &self,
        data: &RemoveMultipleRequest,
    ) -> CloudinaryRemoveMultipleData {
        CloudinaryRemoveMultipleData {
            username: data.username.clone(),
            folder_id: data.folder_id,
            files: data
                .files
                .iter()
                .map(|file| CloudinaryRemoteFile {
                    name: file.name.clone(),
                    upload_type: delivery_mode(&file.visibility),
                })
                .collect(),
        }
    }
}
