//! Test helpers for the web API tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use fileshare::file::TempStorage;
use fileshare::image::{MemoryImageApi, SharedImageApi};
use fileshare::web::middleware::RateLimitState;
use fileshare::web::{create_health_router, create_router, AppState};
use fileshare::Database;

/// A running test app with handles to its backing stores.
pub struct TestApp {
    pub server: TestServer,
    pub db: Database,
    pub images: Arc<MemoryImageApi>,
    pub uploads: TempStorage,
    _upload_dir: TempDir,
}

/// Create a test app with generous rate limits.
pub async fn create_test_app() -> TestApp {
    create_test_app_with_limits(100, 1000).await
}

/// Create a test app with the given rate limits (requests per minute).
pub async fn create_test_app_with_limits(login_rate_limit: u32, api_rate_limit: u32) -> TestApp {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let upload_dir = TempDir::new().expect("Failed to create upload dir");
    let uploads = TempStorage::new(upload_dir.path()).expect("Failed to create upload storage");
    let images = Arc::new(MemoryImageApi::new());
    let shared: SharedImageApi = images.clone();

    let app_state = Arc::new(
        AppState::new(db.clone(), shared, uploads.clone()).with_max_upload_size(1024 * 1024),
    );
    let rate_limit = Arc::new(RateLimitState::new(login_rate_limit, api_rate_limit));

    let router = create_router(app_state, rate_limit, &[]).merge(create_health_router());
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        db,
        images,
        uploads,
        _upload_dir: upload_dir,
    }
}

impl TestApp {
    /// Register a user with the default test password.
    pub async fn signup(&self, username: &str) -> Value {
        self.server
            .post("/api/auth/signup")
            .json(&json!({
                "username": username,
                "name": format!("{username} test"),
                "password": "password123",
                "cpassword": "password123"
            }))
            .await
            .json::<Value>()
    }

    /// Register and log in a user, returning the session token.
    pub async fn login_as(&self, username: &str) -> String {
        self.signup(username).await;

        let response = self
            .server
            .post("/api/auth/login")
            .json(&json!({
                "username": username,
                "password": "password123"
            }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        body["data"]["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    /// Create a folder and return its ID.
    pub async fn create_folder(&self, token: &str, name: &str, visibility: i64) -> i64 {
        let response = self
            .server
            .post("/api/folders")
            .add_header(AUTHORIZATION, format!("Bearer {}", token))
            .json(&json!({ "name": name, "visibility": visibility }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        response.json::<Value>()["data"]["id"]
            .as_i64()
            .expect("folder id")
    }

    /// Upload a small PNG and return the response body.
    pub async fn upload(
        &self,
        token: &str,
        folder_id: i64,
        name: &str,
        visibility: i64,
    ) -> axum_test::TestResponse {
        self.server
            .post(&format!("/api/folders/{}/files", folder_id))
            .add_header(AUTHORIZATION, format!("Bearer {}", token))
            .multipart(image_form(name, visibility))
            .await
    }

    /// Upload a small PNG and return the new file ID.
    pub async fn upload_ok(&self, token: &str, folder_id: i64, name: &str, visibility: i64) -> i64 {
        let response = self.upload(token, folder_id, name, visibility).await;
        response.assert_status(axum::http::StatusCode::CREATED);

        response.json::<Value>()["data"]["id"]
            .as_i64()
            .expect("file id")
    }
}

/// Bytes that look like the start of a PNG.
pub fn png_bytes() -> Vec<u8> {
    vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0]
}

/// Multipart form for an image upload.
pub fn image_form(name: &str, visibility: i64) -> MultipartForm {
    MultipartForm::new()
        .add_text("name", name.to_string())
        .add_text("visibility", visibility.to_string())
        .add_part(
            "image",
            Part::bytes(png_bytes())
                .file_name("upload.png")
                .mime_type("image/png"),
        )
}
