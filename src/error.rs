//! Error types for fileshare.

use thiserror::Error;

use crate::image::ImageApiError;
use crate::validation::FieldErrors;

/// Common error type for fileshare.
#[derive(Error, Debug)]
pub enum FileshareError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Permission denied error.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Field-level validation failures for a submitted form.
    #[error("validation error: {0}")]
    InvalidFields(FieldErrors),

    /// A per-user quota was reached.
    #[error("{0}")]
    LimitReached(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Remote image provider error.
    #[error("image error: {0}")]
    Image(#[from] ImageApiError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for FileshareError {
    fn from(e: sqlx::Error) -> Self {
        FileshareError::Database(e.to_string())
    }
}

/// Result type alias for fileshare operations.
pub type Result<T> = std::result::Result<T, FileshareError>;
