//! Folder and file management for fileshare.
//!
//! This module provides:
//! - Folder and file metadata repositories
//! - Services tying metadata to the remote image provider
//! - Public share lookups
//! - Buffered upload storage and the retention sweep

mod folder;
mod metadata;
mod retention;
mod service;
mod share;
mod storage;

pub use folder::{Folder, FolderRepository, FolderUpdate, NewFolder};
pub use metadata::{FileMetadata, FileRepository, FileUpdate, NewFile, OwnedFile};
pub use retention::{sweep, SweepReport};
pub use service::{FileForm, FileService, FileWithUrl, FolderForm, FolderService, FolderWithFiles};
pub use share::{ShareService, SharedFile};
pub use storage::{TempStorage, TempUpload};

/// Maximum folders per user.
pub const MAX_FOLDERS_PER_USER: i64 = 10;

/// Maximum files per user, across all folders.
pub const MAX_FILES_PER_USER: i64 = 10;

/// Default maximum image size (10MB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;
