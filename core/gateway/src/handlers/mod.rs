//! Request handlers, one module per endpoint.

mod delete;
mod download;
mod list;
mod metadata;
mod upload;

use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use drivegate_storage::RemoteFile;

pub use delete::{delete_file, DeleteConfirmation};
pub use download::download_file;
pub use list::{list_files, FolderListing, ListParams};
pub use metadata::{file_metadata, MetadataRequest};
pub use upload::upload_file;

const MSG_LIST_FAILED: &str = "Failed to list files in Google Drive";
const MSG_DELETE_FAILED: &str = "Failed to delete file from Google Drive";
const MSG_UPLOAD_FAILED: &str = "Failed to upload file to Google Drive";
const MSG_METADATA_FAILED: &str = "Failed to get file metadata from Google Drive";
const MSG_DOWNLOAD_FAILED: &str = "Failed to get file from Google Drive";
const MSG_READ_FILE_FAILED: &str = "Failed to read file from request";

/// Success body: a human-readable message plus the payload.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub message: &'static str,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(message: &'static str, data: T) -> Self {
        Self { message, data }
    }
}

/// The three fields clients get back for a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub file_id: String,
    pub file_name: String,
    pub file_url: String,
}

impl From<RemoteFile> for FileSummary {
    fn from(file: RemoteFile) -> Self {
        Self {
            file_id: file.id,
            file_name: file.name,
            file_url: file.web_view_link.unwrap_or_default(),
        }
    }
}

/// Liveness probe; never touches the remote store.
pub async fn healthz() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_without_link() {
        let summary = FileSummary::from(RemoteFile {
            id: "1".to_string(),
            name: "a.txt".to_string(),
            mime_type: None,
            parents: vec![],
            web_view_link: None,
        });
        assert_eq!(summary.file_url, "");
    }

    #[test]
    fn test_envelope_shape() {
        let value = serde_json::to_value(Envelope::new(
            "File successfully uploaded",
            FileSummary {
                file_id: "1".to_string(),
                file_name: "a.txt".to_string(),
                file_url: "https://x".to_string(),
            },
        ))
        .unwrap();

        assert_eq!(
            value,
            json!({
                "message": "File successfully uploaded",
                "data": {"file_id": "1", "file_name": "a.txt", "file_url": "https://x"}
            })
        );
    }
}
