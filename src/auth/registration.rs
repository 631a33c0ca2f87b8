//! User registration for fileshare.

use sqlx::SqlitePool;
use tracing::info;

use crate::auth::hash_password;
use crate::db::{NewUser, User, UserRepository};
use crate::validation::{self, FieldErrors};
use crate::{FileshareError, Result};

/// Signup form data.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    /// Desired username (3-30 ASCII letters and digits).
    pub username: String,
    /// Display name.
    pub name: String,
    /// Password (at least 8 characters).
    pub password: String,
    /// Password confirmation.
    pub cpassword: String,
}

impl SignupForm {
    /// Create a signup form whose confirmation matches the password.
    pub fn new(
        username: impl Into<String>,
        name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let password = password.into();
        Self {
            username: username.into(),
            name: name.into(),
            cpassword: password.clone(),
            password,
        }
    }

    /// Set a different confirmation.
    pub fn with_confirmation(mut self, cpassword: impl Into<String>) -> Self {
        self.cpassword = cpassword.into();
        self
    }
}

/// Register a new user.
///
/// This function:
/// 1. Validates every field, including username uniqueness
/// 2. Hashes the password
/// 3. Creates the user in the database
///
/// All field failures are reported together as
/// [`FileshareError::InvalidFields`].
pub async fn register(pool: &SqlitePool, form: SignupForm) -> Result<User> {
    let repo = UserRepository::new(pool);
    let mut errors = FieldErrors::new();

    let username = errors.check("username", validation::username(&form.username));
    if let Some(ref username) = username {
        if repo.username_exists(username).await? {
            errors.add("username", "Username already exists");
        }
    }
    let name = errors.check("name", validation::display_name(&form.name));
    errors.check("password", validation::password(&form.password));
    errors.check(
        "cpassword",
        validation::password_confirmation(&form.password, &form.cpassword),
    );

    errors.into_result().map_err(FileshareError::InvalidFields)?;
    let (Some(username), Some(name)) = (username, name) else {
        return Err(FileshareError::Validation("invalid signup form".to_string()));
    };

    let password_hash =
        hash_password(&form.password).map_err(|e| FileshareError::Auth(e.to_string()))?;

    let user = repo
        .create(&NewUser::new(username, name, password_hash))
        .await?;

    info!(
        username = %user.username,
        user_id = user.id,
        "New user registered"
    );

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::Database;

    fn field_errors(result: Result<User>) -> FieldErrors {
        match result {
            Err(FileshareError::InvalidFields(errors)) => errors,
            other => panic!("expected field errors, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_success() {
        let db = Database::open_in_memory().await.unwrap();

        let user = register(db.pool(), SignupForm::new("alice", "  Alice Smith ", "password123"))
            .await
            .unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(user.name, "Alice Smith");
        assert_ne!(user.password, "password123");
        assert!(verify_password("password123", &user.password).is_ok());
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let db = Database::open_in_memory().await.unwrap();
        register(db.pool(), SignupForm::new("alice", "Alice", "password123"))
            .await
            .unwrap();

        let errors = field_errors(
            register(db.pool(), SignupForm::new("ALICE", "Other", "password123")).await,
        );
        assert_eq!(errors.get("username"), ["Username already exists"]);
    }

    #[tokio::test]
    async fn test_register_reports_every_field() {
        let db = Database::open_in_memory().await.unwrap();

        let form = SignupForm::new("al ice", "", "short").with_confirmation("other");
        let errors = field_errors(register(db.pool(), form).await);

        assert_eq!(
            errors.get("username"),
            ["Username must only contain letters and numbers"]
        );
        assert_eq!(errors.get("name"), ["Name must not be empty"]);
        assert_eq!(
            errors.get("password"),
            ["Password must be at least 8 characters long"]
        );
        assert_eq!(errors.get("cpassword"), ["Passwords do not match"]);
    }

    #[tokio::test]
    async fn test_register_missing_confirmation() {
        let db = Database::open_in_memory().await.unwrap();

        let form = SignupForm::new("alice", "Alice", "password123").with_confirmation("");
        let errors = field_errors(register(db.pool(), form).await);
        assert_eq!(errors.get("cpassword"), ["Please verify your password"]);
        assert!(!errors.has("username"));
    }
}
