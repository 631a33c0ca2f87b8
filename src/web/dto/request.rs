//! Request DTOs for Web API.

use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::SignupForm;
use crate::file::{FileForm, FolderForm};

use super::validation::no_control_chars;

/// Login request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, message = "Username must not be empty"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Signup request.
///
/// Field rules (format, length, uniqueness) are checked by registration so
/// that every message carries its field label.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    /// Username (letters and numbers).
    #[validate(length(max = 256, message = "Username is too long"))]
    #[serde(default)]
    pub username: String,
    /// Display name.
    #[validate(length(max = 256, message = "Name is too long"))]
    #[serde(default)]
    pub name: String,
    /// Password.
    #[validate(length(max = 1024, message = "Password is too long"))]
    #[serde(default)]
    pub password: String,
    /// Password confirmation.
    #[validate(length(max = 1024, message = "Password is too long"))]
    #[serde(default)]
    pub cpassword: String,
}

impl From<SignupRequest> for SignupForm {
    fn from(req: SignupRequest) -> Self {
        SignupForm::new(req.username, req.name, req.password).with_confirmation(req.cpassword)
    }
}

/// Folder create/edit request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FolderRequest {
    /// Folder name.
    #[validate(
        length(max = 256, message = "Folder name is too long"),
        custom(function = "no_control_chars")
    )]
    #[serde(default)]
    pub name: String,
    /// Optional description.
    #[validate(length(max = 1024, message = "Description is too long"))]
    #[serde(default)]
    pub description: Option<String>,
    /// Visibility option ID, as a number or a numeric string.
    #[serde(default, deserialize_with = "string_or_number")]
    #[schema(value_type = String, example = "2")]
    pub visibility: String,
}

impl From<FolderRequest> for FolderForm {
    fn from(req: FolderRequest) -> Self {
        FolderForm {
            name: req.name,
            description: req.description,
            visibility: req.visibility,
        }
    }
}

/// File edit request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FileEditRequest {
    /// File name.
    #[validate(
        length(max = 256, message = "File name is too long"),
        custom(function = "no_control_chars")
    )]
    #[serde(default)]
    pub name: String,
    /// Optional description.
    #[validate(length(max = 1024, message = "Description is too long"))]
    #[serde(default)]
    pub description: Option<String>,
    /// Visibility option ID, as a number or a numeric string.
    #[serde(default, deserialize_with = "string_or_number")]
    #[schema(value_type = String, example = "1")]
    pub visibility: String,
}

impl From<FileEditRequest> for FileForm {
    fn from(req: FileEditRequest) -> Self {
        FileForm {
            name: req.name,
            description: req.description,
            visibility: req.visibility,
        }
    }
}

/// Accept `"2"` or `2` and keep the raw text, so that parsing errors are
/// reported as field errors rather than JSON errors.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
        Null,
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
        Raw::Null => String::new(),
    })
}
