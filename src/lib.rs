//! fileshare - multi-user image sharing
//!
//! Users sign up, organise images into folders, choose per-folder and
//! per-file visibility, and share public items by link. Image bytes are
//! stored with a remote image CDN behind the [`image::ImageApi`] facade.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod image;
pub mod logging;
pub mod validation;
pub mod web;

pub use auth::{
    authenticate, hash_password, login, logout, register, verify_password, PasswordError,
    SignupForm,
};
pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{FileshareError, Result};
pub use file::{
    sweep, FileService, FolderService, ShareService, SweepReport, TempStorage, TempUpload,
};
pub use image::{create_image_api, ImageApi, ImageApiError, MemoryImageApi, SharedImageApi};
pub use web::{AppState, WebServer};
