//! Remote store trait definition.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::pin::Pin;

use drivegate_common::{FileId, FolderId, Result};

use crate::query::DriveQuery;

/// Fallback content type when the uploader or the remote store gives none.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// File resource as reported by the remote store.
///
/// Only the fields the gateway asks for are modelled; absent optional
/// fields are omitted when serialized back to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    /// File ID.
    pub id: String,
    /// File name.
    pub name: String,
    /// MIME type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Parent folder IDs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    /// Shareable link granting view access.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
}

impl RemoteFile {
    /// Typed identifier of this file.
    ///
    /// # Errors
    /// - The store returned an empty id
    pub fn file_id(&self) -> Result<FileId> {
        FileId::new(self.id.clone())
    }
}

/// A file to be created under a folder.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub name: String,
    pub mime_type: String,
    pub parent: FolderId,
    pub content: Bytes,
}

/// Byte stream type for download operations.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Streamed file content with the type reported by the remote store.
///
/// Dropping the value releases the underlying connection.
pub struct DownloadStream {
    pub content_type: String,
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

impl fmt::Debug for DownloadStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadStream")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Remote file store used by the gateway handlers.
///
/// Every operation is a single synchronous call against the store. Errors
/// are surfaced to the caller as-is; nothing is retried.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Get the store name (e.g., "gdrive", "memory").
    fn name(&self) -> &str;

    /// Upload content as a new file under `file.parent`.
    ///
    /// # Postconditions
    /// - A new file exists; same-named files are left untouched
    ///
    /// # Errors
    /// - Parent folder not found or not writable
    /// - Network/authentication errors
    async fn create(&self, file: NewFile) -> Result<RemoteFile>;

    /// List files matching a query.
    async fn list(&self, query: &DriveQuery) -> Result<Vec<RemoteFile>>;

    /// First file matching a query, in the store's listing order.
    async fn find_first(&self, query: &DriveQuery) -> Result<Option<RemoteFile>> {
        Ok(self.list(query).await?.into_iter().next())
    }

    /// Get file metadata by ID.
    ///
    /// # Errors
    /// - File not found
    async fn get(&self, id: &FileId) -> Result<RemoteFile>;

    /// Open the content of a file as a stream.
    async fn download(&self, id: &FileId) -> Result<DownloadStream>;

    /// Delete a file permanently.
    ///
    /// No existence check is made beforehand; a missing file is reported by
    /// the store itself.
    async fn delete(&self, id: &FileId) -> Result<()>;
}
