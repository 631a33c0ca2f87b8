//! Cloudinary client tests against a local mock of the upload API.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Form, Json, Router};
use serde_json::json;
use tempfile::TempDir;
use tokio::net::TcpListener;

use fileshare::config::ImageConfig;
use fileshare::image::{
    CloudinaryApi, DeliveryMode, EditRequest, ImageApi, ImageApiError, RemoteFile,
    RemoveMultipleRequest, RemoveRequest, UploadRequest,
};

/// Requests seen by the mock, as `(action, fields)`.
#[derive(Clone, Default)]
struct Recorded(Arc<Mutex<Vec<(String, HashMap<String, String>)>>>);

impl Recorded {
    fn push(&self, action: &str, fields: HashMap<String, String>) {
        self.0.lock().unwrap().push((action.to_string(), fields));
    }

    fn all(&self) -> Vec<(String, HashMap<String, String>)> {
        self.0.lock().unwrap().clone()
    }
}

async fn upload(State(recorded): State<Recorded>, mut multipart: Multipart) -> impl IntoResponse {
    let mut fields = HashMap::new();
    let mut size = 0;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            fields.insert(
                "file_content_type".to_string(),
                field.content_type().unwrap_or("").to_string(),
            );
            size = field.bytes().await.unwrap().len();
        } else {
            fields.insert(name, field.text().await.unwrap());
        }
    }
    let public_id = fields.get("public_id").cloned().unwrap_or_default();
    recorded.push("upload", fields);

    Json(json!({
        "public_id": public_id,
        "secure_url": format!("https://res.example/{}", public_id),
        "bytes": size
    }))
}

async fn rename(
    State(recorded): State<Recorded>,
    Form(fields): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    let to = fields.get("to_public_id").cloned().unwrap_or_default();
    let from = fields.get("from_public_id").cloned().unwrap_or_default();
    recorded.push("rename", fields);

    if from.ends_with("missing") {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "message": format!("Resource not found - {}", from) } })),
        );
    }
    (StatusCode::OK, Json(json!({ "public_id": to })))
}

async fn destroy(
    State(recorded): State<Recorded>,
    Form(fields): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    let public_id = fields.get("public_id").cloned().unwrap_or_default();
    recorded.push("destroy", fields);

    let result = if public_id.ends_with("missing") {
        "not found"
    } else {
        "ok"
    };
    Json(json!({ "result": result }))
}

async fn start_mock() -> (SocketAddr, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/v1_1/demo/image/upload", post(upload))
        .route("/v1_1/demo/image/rename", post(rename))
        .route("/v1_1/demo/image/destroy", post(destroy))
        .with_state(recorded.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, recorded)
}

fn client(addr: SocketAddr) -> CloudinaryApi {
    let config = ImageConfig {
        cloud_name: "demo".to_string(),
        api_key: "1234".to_string(),
        api_secret: "abcd".to_string(),
        api_base_url: format!("http://{}/v1_1", addr),
        timeout_secs: 5,
        ..ImageConfig::default()
    };
    CloudinaryApi::new(&config).unwrap()
}

#[tokio::test]
async fn test_upload_sends_signed_multipart() {
    let (addr, recorded) = start_mock().await;
    let api = client(addr);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("buffer-cat.png");
    std::fs::write(&path, b"\x89PNG fake").unwrap();

    let result = api
        .upload(&UploadRequest {
            file_path: path,
            username: "alice".to_string(),
            folder_id: 7,
            file_name: "cat".to_string(),
            file_visibility: "public".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(result.public_id, "alice-7-cat");
    assert_eq!(result.delivery_mode, DeliveryMode::Upload);
    assert_eq!(result.bytes, Some(9));

    let calls = recorded.all();
    assert_eq!(calls.len(), 1);
    let (action, fields) = &calls[0];
    assert_eq!(action, "upload");
    assert_eq!(fields["public_id"], "alice-7-cat");
    assert_eq!(fields["type"], "upload");
    assert_eq!(fields["api_key"], "1234");
    assert_eq!(fields["file_content_type"], "image/png");
    assert!(fields.contains_key("timestamp"));
    assert_eq!(fields["signature"].len(), 40);
}

#[tokio::test]
async fn test_upload_private_uses_authenticated_type() {
    let (addr, recorded) = start_mock().await;
    let api = client(addr);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("buffer.jpg");
    std::fs::write(&path, b"jpeg").unwrap();

    let result = api
        .upload(&UploadRequest {
            file_path: path,
            username: "bob".to_string(),
            folder_id: 3,
            file_name: "dog".to_string(),
            file_visibility: "private".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(result.delivery_mode, DeliveryMode::Authenticated);
    assert_eq!(recorded.all()[0].1["type"], "authenticated");
}

#[tokio::test]
async fn test_edit_sends_rename_with_types() {
    let (addr, recorded) = start_mock().await;
    let api = client(addr);

    let result = api
        .edit(&EditRequest {
            username: "alice".to_string(),
            folder_id: 7,
            old_name: "cat".to_string(),
            new_name: "cat".to_string(),
            current_file_visibility: "public".to_string(),
            updated_file_visibility: "private".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(result.public_id, "alice-7-cat");
    assert_eq!(result.delivery_mode, DeliveryMode::Authenticated);

    let calls = recorded.all();
    let (action, fields) = &calls[0];
    assert_eq!(action, "rename");
    assert_eq!(fields["from_public_id"], "alice-7-cat");
    assert_eq!(fields["to_public_id"], "alice-7-cat");
    assert_eq!(fields["type"], "upload");
    assert_eq!(fields["to_type"], "authenticated");
}

#[tokio::test]
async fn test_edit_failure_is_generic() {
    let (addr, _recorded) = start_mock().await;
    let api = client(addr);

    let err = api
        .edit(&EditRequest {
            username: "alice".to_string(),
            folder_id: 7,
            old_name: "missing".to_string(),
            new_name: "found".to_string(),
            current_file_visibility: "public".to_string(),
            updated_file_visibility: "public".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err, ImageApiError::Edit);
    assert!(!err.to_string().contains("Resource not found"));
}

#[tokio::test]
async fn test_remove_not_found_is_distinct() {
    let (addr, recorded) = start_mock().await;
    let api = client(addr);

    let ok = api
        .remove(&RemoveRequest {
            username: "alice".to_string(),
            folder_id: 7,
            file_name: "cat".to_string(),
            file_visibility: "private".to_string(),
        })
        .await;
    assert!(ok.is_ok());
    assert_eq!(recorded.all()[0].1["type"], "authenticated");

    let missing = api
        .remove(&RemoveRequest {
            username: "alice".to_string(),
            folder_id: 7,
            file_name: "missing".to_string(),
            file_visibility: "public".to_string(),
        })
        .await;
    assert_eq!(missing, Err(ImageApiError::NotFound));
}

#[tokio::test]
async fn test_remove_multiple_stops_at_first_failure() {
    let (addr, recorded) = start_mock().await;
    let api = client(addr);

    let result = api
        .remove_multiple(&RemoveMultipleRequest {
            username: "alice".to_string(),
            folder_id: 7,
            files: vec![
                RemoteFile {
                    name: "cat".to_string(),
                    visibility: "public".to_string(),
                },
                RemoteFile {
                    name: "missing".to_string(),
                    visibility: "public".to_string(),
                },
                RemoteFile {
                    name: "dog".to_string(),
                    visibility: "private".to_string(),
                },
            ],
        })
        .await;
    assert!(result.is_err());

    let ids: Vec<String> = recorded
        .all()
        .into_iter()
        .map(|(_, fields)| fields["public_id"].clone())
        .collect();
    assert_eq!(ids, ["alice-7-cat", "alice-7-missing"]);
}

#[tokio::test]
async fn test_unreachable_api_is_upload_error() {
    let api = client("127.0.0.1:9".parse().unwrap());

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cat.png");
    std::fs::write(&path, b"png").unwrap();

    let err = api
        .upload(&UploadRequest {
            file_path: path,
            username: "alice".to_string(),
            folder_id: 7,
            file_name: "cat".to_string(),
            file_visibility: "public".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err, ImageApiError::Upload);
}
