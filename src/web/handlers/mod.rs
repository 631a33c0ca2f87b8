//! API handlers.

pub mod auth;
pub mod file;
pub mod folder;
pub mod share;
pub mod visibility;

pub use auth::*;
pub use file::*;
pub use folder::*;
pub use share::*;
pub use visibility::*;

use crate::auth::DEFAULT_SESSION_DURATION_SECS;
use crate::file::{TempStorage, DEFAULT_MAX_UPLOAD_SIZE};
use crate::image::SharedImageApi;
use crate::Database;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Database,
    /// Remote image provider.
    pub images: SharedImageApi,
    /// Buffer directory for incoming images.
    pub uploads: TempStorage,
    /// Maximum image size in bytes.
    pub max_upload_size: u64,
    /// Session lifetime in seconds.
    pub session_expiry_secs: u64,
    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,
}

impl AppState {
    /// Create a new application state with default limits.
    pub fn new(db: Database, images: SharedImageApi, uploads: TempStorage) -> Self {
        Self {
            db,
            images,
            uploads,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            session_expiry_secs: DEFAULT_SESSION_DURATION_SECS,
            secure_cookies: false,
        }
    }

    /// Set the maximum image size in bytes.
    pub fn with_max_upload_size(mut self, bytes: u64) -> Self {
        self.max_upload_size = bytes;
        self
    }

    /// Set the session lifetime.
    pub fn with_session_expiry(mut self, secs: u64) -> Self {
        self.session_expiry_secs = secs;
        self
    }

    /// Mark session cookies `Secure`.
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }
}
