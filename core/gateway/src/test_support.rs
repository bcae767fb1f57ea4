//! Helpers for driving the router against an in-memory store.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use drivegate_storage::MemoryStore;

use crate::config::ReplaceScope;
use crate::server::{build_router, AppState};

pub const BOUNDARY: &str = "drivegate-test-boundary";

pub fn app(store: Arc<MemoryStore>) -> Router {
    app_with_scope(store, ReplaceScope::Folder)
}

pub fn app_with_scope(store: Arc<MemoryStore>, replace_scope: ReplaceScope) -> Router {
    build_router(
        AppState {
            store,
            replace_scope,
        },
        1024 * 1024,
    )
}

/// Send a request and decode the JSON body.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

/// A file part for [`upload_request`]: filename, content type, content.
pub struct Part<'a> {
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub content: &'a [u8],
}

/// Build a `multipart/form-data` upload request.
pub fn upload_request(folder: Option<&str>, file: Option<Part<'_>>) -> Request<Body> {
    let mut body = Vec::new();

    if let Some(folder) = folder {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"folder\"\r\n\r\n");
        body.extend_from_slice(folder.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    if let Some(part) = file {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                part.file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", part.content_type).as_bytes());
        body.extend_from_slice(part.content);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::post("/upload/file")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}
