//! Form field validation for fileshare.
//!
//! Each field rule trims and checks a raw value in a fixed order and stops at
//! the first failure, returning the message shown for that field. Rules that
//! need the database (uniqueness, visibility existence) live in the services
//! and report through the same [`FieldErrors`] collection.

use std::collections::BTreeMap;
use std::fmt;

/// Minimum length for names and usernames.
pub const MIN_NAME_LENGTH: usize = 3;

/// Maximum length for names and usernames.
pub const MAX_NAME_LENGTH: usize = 30;

/// Minimum description length.
pub const MIN_DESCRIPTION_LENGTH: usize = 3;

/// Maximum description length.
pub const MAX_DESCRIPTION_LENGTH: usize = 50;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

const EMPTY_ERR: &str = "must not be empty";
const LENGTH_ERR: &str = "must be between 3 and 30 characters";
const DESC_LENGTH_ERR: &str = "must be between 3 and 50 characters";
const PASSWORD_LENGTH_ERR: &str = "must be at least 8 characters long";
const ALPHANUMERIC_ERR: &str = "must only contain letters and numbers";

/// Field-level validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Record the outcome of a field rule, returning the value on success.
    pub fn check<T>(
        &mut self,
        field: &str,
        outcome: std::result::Result<T, String>,
    ) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }

    /// Whether a field already has a message.
    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Messages recorded for a field.
    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check if no messages were recorded.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over fields and their messages.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.fields.iter()
    }

    /// Convert into `Ok(())` when empty or `Err(self)` otherwise.
    pub fn into_result(self) -> std::result::Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn is_alphanumeric_with(value: &str, allowed: impl Fn(char) -> bool) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || allowed(c))
}

/// Punctuation permitted in folder names and descriptions.
fn is_folder_punctuation(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\'' | '.' | '_' | '-' | '(' | ')' | '&')
}

/// Validate a signup username.
///
/// The username is not trimmed: surrounding whitespace fails the character
/// check.
pub fn username(raw: &str) -> std::result::Result<String, String> {
    if raw.is_empty() {
        return Err(format!("Username {EMPTY_ERR}"));
    }
    if !is_alphanumeric_with(raw, |_| false) {
        return Err(format!("Username {ALPHANUMERIC_ERR}"));
    }
    if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&char_len(raw)) {
        return Err(format!("Username {LENGTH_ERR}"));
    }
    Ok(raw.to_string())
}

/// Validate a display name.
pub fn display_name(raw: &str) -> std::result::Result<String, String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(format!("Name {EMPTY_ERR}"));
    }
    if !is_alphanumeric_with(name, |c| c == ' ') {
        return Err(format!("Name {ALPHANUMERIC_ERR}"));
    }
    if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&char_len(name)) {
        return Err(format!("Name {LENGTH_ERR}"));
    }
    Ok(name.to_string())
}

/// Validate a password.
pub fn password(raw: &str) -> std::result::Result<(), String> {
    if raw.is_empty() {
        return Err(format!("Password {EMPTY_ERR}"));
    }
    if char_len(raw) < MIN_PASSWORD_LENGTH {
        return Err(format!("Password {PASSWORD_LENGTH_ERR}"));
    }
    Ok(())
}

/// Validate the password confirmation.
pub fn password_confirmation(password: &str, confirmation: &str) -> std::result::Result<(), String> {
    if confirmation.is_empty() {
        return Err("Please verify your password".to_string());
    }
    if confirmation != password {
        return Err("Passwords do not match".to_string());
    }
    Ok(())
}

/// Validate a folder name.
pub fn folder_name(raw: &str) -> std::result::Result<String, String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(format!("Folder name {EMPTY_ERR}"));
    }
    if !is_alphanumeric_with(name, is_folder_punctuation) {
        return Err(format!("Folder name {ALPHANUMERIC_ERR}"));
    }
    if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&char_len(name)) {
        return Err(format!("Folder name {LENGTH_ERR}"));
    }
    Ok(name.to_string())
}

/// Validate a file name.
///
/// File names become part of the remote image identifier, so only lowercase
/// ASCII letters and digits are accepted.
pub fn file_name(raw: &str) -> std::result::Result<String, String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(format!("File name {EMPTY_ERR}"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        return Err("File name must only contain lowercase letters and numbers".to_string());
    }
    if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&char_len(name)) {
        return Err(format!("File name {LENGTH_ERR}"));
    }
    Ok(name.to_string())
}

/// Validate an optional description.
///
/// `label` prefixes the message, e.g. "Folder description". Missing or blank
/// values are accepted as no description.
pub fn description(label: &str, raw: Option<&str>) -> std::result::Result<Option<String>, String> {
    let description = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(d) => d,
    };
    if !is_alphanumeric_with(description, is_folder_punctuation) {
        return Err(format!("{label} {ALPHANUMERIC_ERR}"));
    }
    if !(MIN_DESCRIPTION_LENGTH..=MAX_DESCRIPTION_LENGTH).contains(&char_len(description)) {
        return Err(format!("{label} {DESC_LENGTH_ERR}"));
    }
    Ok(Some(description.to_string()))
}

/// Parse a submitted visibility option id.
pub fn visibility_id(raw: &str) -> std::result::Result<i64, String> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| "Visibility option format is invalid!".to_string())
}

/// Validate an uploaded image part.
pub fn image(
    content_type: Option<&str>,
    size: u64,
    max_size: u64,
) -> std::result::Result<(), String> {
    if size == 0 {
        return Err(format!("Image {EMPTY_ERR}"));
    }
    if !content_type.is_some_and(|ct| ct.starts_with("image/")) {
        return Err("Image must be an image file".to_string());
    }
    if size > max_size {
        return Err(format!("Image must be at most {} MB", max_size / 1024 / 1024));
    }
    Ok(())
}
