//! Web API File Tests
//!
//! Integration tests for image upload, lookup, editing and deletion.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::{json, Value};

use common::{create_test_app, png_bytes};
use fileshare::image::DeliveryMode;

#[tokio::test]
async fn test_upload_file() {
    let app = create_test_app().await;
    let token = app.login_as("alice").await;
    let folder_id = app.create_folder(&token, "Pets", 2).await;

    let form = MultipartForm::new()
        .add_text("name", "cat")
        .add_text("description", "Sleepy cat")
        .add_text("visibility", "2")
        .add_part(
            "image",
            Part::bytes(png_bytes())
                .file_name("cat.png")
                .mime_type("image/png"),
        );

    let response = app
        .server
        .post(&format!("/api/folders/{}/files", folder_id))
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .multipart(form)
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["data"]["name"], "cat");
    assert_eq!(body["data"]["description"], "Sleepy cat");
    assert_eq!(body["data"]["visibility"], "public");
    assert_eq!(body["data"]["folder_id"], folder_id);

    let public_id = format!("alice-{}-cat", folder_id);
    assert_eq!(app.images.mode_of(&public_id), Some(DeliveryMode::Upload));
    assert_eq!(app.images.bytes_of(&public_id), Some(png_bytes()));

    // The buffered copy is gone
    let leftover = std::fs::read_dir(app.uploads.base_path()).unwrap().count();
    assert_eq!(leftover, 0);
}

#[tokio::test]
async fn test_upload_validation_errors() {
    let app = create_test_app().await;
    let token = app.login_as("alice").await;
    let folder_id = app.create_folder(&token, "Pets", 2).await;

    // Missing image, bad name
    let form = MultipartForm::new()
        .add_text("name", "Cat!")
        .add_text("visibility", "1");
    let response = app
        .server
        .post(&format!("/api/folders/{}/files", folder_id))
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .multipart(form)
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json();
    let details = &body["error"]["details"];
    assert_eq!(
        details["name"][0],
        "File name must only contain lowercase letters and numbers"
    );
    assert_eq!(details["image"][0], "Image must not be empty");

    // Not an image
    let form = MultipartForm::new()
        .add_text("name", "notes")
        .add_text("visibility", "1")
        .add_part(
            "image",
            Part::bytes(b"hello".to_vec())
                .file_name("notes.txt")
                .mime_type("text/plain"),
        );
    let response = app
        .server
        .post(&format!("/api/folders/{}/files", folder_id))
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .multipart(form)
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(
        body["error"]["details"]["image"][0],
        "Image must be an image file"
    );

    // Nothing reached the image provider
    assert!(app.images.is_empty());
    let leftover = std::fs::read_dir(app.uploads.base_path()).unwrap().count();
    assert_eq!(leftover, 0);
}

#[tokio::test]
async fn test_upload_duplicate_name() {
    let app = create_test_app().await;
    let token = app.login_as("alice").await;
    let folder_id = app.create_folder(&token, "Pets", 2).await;
    app.upload_ok(&token, folder_id, "cat", 2).await;

    let response = app.upload(&token, folder_id, "cat", 2).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(
        body["error"]["details"]["name"][0],
        "File \"cat\" already exists"
    );
}

#[tokio::test]
async fn test_file_limit_across_folders() {
    let app = create_test_app().await;
    let token = app.login_as("alice").await;
    let first = app.create_folder(&token, "First", 1).await;
    let second = app.create_folder(&token, "Second", 1).await;

    for i in 0..5 {
        app.upload_ok(&token, first, &format!("img{}", i), 1).await;
        app.upload_ok(&token, second, &format!("img{}", i), 1).await;
    }

    let response = app.upload(&token, second, "extra", 1).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "You've reached the file limit");
    assert_eq!(app.images.len(), 10);
}

#[tokio::test]
async fn test_upload_to_other_users_folder() {
    let app = create_test_app().await;
    let alice = app.login_as("alice").await;
    let bob = app.login_as("bob").await;
    let folder_id = app.create_folder(&alice, "Pets", 2).await;

    let response = app.upload(&bob, folder_id, "cat", 2).await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert!(app.images.is_empty());
}

#[tokio::test]
async fn test_get_file_with_url() {
    let app = create_test_app().await;
    let token = app.login_as("alice").await;
    let folder_id = app.create_folder(&token, "Pets", 2).await;
    let file_id = app.upload_ok(&token, folder_id, "cat", 1).await;

    let response = app
        .server
        .get(&format!("/api/folders/{}/files/{}", folder_id, file_id))
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["data"]["file"]["name"], "cat");
    assert_eq!(body["data"]["file"]["visibility"], "private");
    assert_eq!(
        body["data"]["url"],
        format!("memory://authenticated/alice-{}-cat", folder_id)
    );
}

#[tokio::test]
async fn test_get_file_in_wrong_folder() {
    let app = create_test_app().await;
    let token = app.login_as("alice").await;
    let pets = app.create_folder(&token, "Pets", 2).await;
    let other = app.create_folder(&token, "Other", 2).await;
    let file_id = app.upload_ok(&token, pets, "cat", 2).await;

    app.server
        .get(&format!("/api/folders/{}/files/{}", other, file_id))
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_edit_visibility_keeps_identifier() {
    let app = create_test_app().await;
    let token = app.login_as("alice").await;
    let folder_id = app.create_folder(&token, "Pets", 2).await;
    let file_id = app.upload_ok(&token, folder_id, "cat", 2).await;
    let public_id = format!("alice-{}-cat", folder_id);

    let response = app
        .server
        .put(&format!("/api/folders/{}/files/{}", folder_id, file_id))
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .json(&json!({ "name": "cat", "visibility": 1 }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["data"]["visibility"], "private");
    assert_eq!(
        app.images.mode_of(&public_id),
        Some(DeliveryMode::Authenticated)
    );
}

#[tokio::test]
async fn test_edit_rename_moves_remote_image() {
    let app = create_test_app().await;
    let token = app.login_as("alice").await;
    let folder_id = app.create_folder(&token, "Pets", 2).await;
    let file_id = app.upload_ok(&token, folder_id, "cat", 2).await;

    let response = app
        .server
        .put(&format!("/api/folders/{}/files/{}", folder_id, file_id))
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .json(&json!({ "name": "kitten", "description": "Renamed", "visibility": "2" }))
        .await;
    response.assert_status_ok();

    assert!(!app.images.contains(&format!("alice-{}-cat", folder_id)));
    assert_eq!(
        app.images.mode_of(&format!("alice-{}-kitten", folder_id)),
        Some(DeliveryMode::Upload)
    );

    let response = app
        .server
        .get(&format!("/api/folders/{}/files/{}", folder_id, file_id))
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["file"]["name"], "kitten");
    assert_eq!(body["data"]["file"]["description"], "Renamed");
}

#[tokio::test]
async fn test_edit_description_only_skips_remote() {
    let app = create_test_app().await;
    let token = app.login_as("alice").await;
    let folder_id = app.create_folder(&token, "Pets", 2).await;
    let file_id = app.upload_ok(&token, folder_id, "cat", 2).await;

    // Any remote call on this image would now fail
    app.images.fail_on(format!("alice-{}-cat", folder_id));

    let response = app
        .server
        .put(&format!("/api/folders/{}/files/{}", folder_id, file_id))
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .json(&json!({ "name": "cat", "description": "Still a cat", "visibility": 2 }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["description"], "Still a cat");
}

#[tokio::test]
async fn test_delete_file() {
    let app = create_test_app().await;
    let token = app.login_as("alice").await;
    let folder_id = app.create_folder(&token, "Pets", 2).await;
    let file_id = app.upload_ok(&token, folder_id, "cat", 2).await;

    let response = app
        .server
        .delete(&format!("/api/folders/{}/files/{}", folder_id, file_id))
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await;
    response.assert_status_ok();

    assert!(app.images.is_empty());
    app.server
        .get(&format!("/api/folders/{}/files/{}", folder_id, file_id))
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_file_remote_failure_keeps_row() {
    let app = create_test_app().await;
    let token = app.login_as("alice").await;
    let folder_id = app.create_folder(&token, "Pets", 2).await;
    let file_id = app.upload_ok(&token, folder_id, "cat", 2).await;
    app.images.fail_on(format!("alice-{}-cat", folder_id));

    app.server
        .delete(&format!("/api/folders/{}/files/{}", folder_id, file_id))
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let response = app
        .server
        .get(&format!("/api/folders/{}", folder_id))
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"]["files"][0]["id"], file_id);
}
