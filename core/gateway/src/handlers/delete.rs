//! `DELETE /file/delete/{file_id}`

use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use drivegate_common::FileId;

use super::MSG_DELETE_FAILED;
use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct DeleteConfirmation {
    pub message: &'static str,
    pub file_id: String,
}

/// No existence check; a missing id surfaces as an upstream failure.
pub async fn delete_file(
    State(state): State<AppState>,
    file_id: Result<Path<String>, PathRejection>,
) -> Result<Json<DeleteConfirmation>, ApiError> {
    let Path(file_id) = file_id.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let file_id = FileId::new(file_id)?;

    state
        .store
        .delete(&file_id)
        .await
        .map_err(|e| ApiError::upstream(MSG_DELETE_FAILED, e))?;

    info!(file_id = %file_id, "File deleted");

    Ok(Json(DeleteConfirmation {
        message: "File successfully deleted",
        file_id: file_id.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{app, send};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use drivegate_common::FolderId;
    use drivegate_storage::{MemoryStore, StoreOp};
    use serde_json::json;
    use std::sync::Arc;

    fn delete(id: &str) -> Request<Body> {
        Request::delete(format!("/file/delete/{}", id))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_delete_then_delete_again() {
        let store = Arc::new(MemoryStore::new());
        let file = store
            .insert("a.txt", "text/plain", &FolderId::new("f").unwrap(), "a")
            .await;

        let (status, json) = send(app(store.clone()), delete(&file.id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!({"message": "File successfully deleted", "file_id": file.id})
        );
        assert!(store.is_empty().await);

        let (status, json) = send(app(store), delete(&file.id)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Failed to delete file from Google Drive");
    }

    #[tokio::test]
    async fn test_undecodable_id_gets_json_error() {
        let store = Arc::new(MemoryStore::new());

        let (status, json) = send(app(store.clone()), delete("%FF")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
        assert!(store.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure() {
        let store = Arc::new(MemoryStore::new());
        let file = store
            .insert("a.txt", "text/plain", &FolderId::new("f").unwrap(), "a")
            .await;
        store.fail(StoreOp::Delete).await;

        let (status, json) = send(app(store.clone()), delete(&file.id)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Failed to delete file from Google Drive");
        assert_eq!(store.len().await, 1);
    }
}
