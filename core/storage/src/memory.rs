//! In-memory remote store for testing.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, Stream};
use std::collections::HashSet;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use drivegate_common::{Error, FileId, FolderId, Result};

use crate::provider::{ByteStream, DownloadStream, NewFile, RemoteFile, RemoteStore};
use crate::query::DriveQuery;

/// Size of the chunks a download is split into.
const DOWNLOAD_CHUNK: usize = 4096;

/// One call made against the store, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Create { name: String, parent: String },
    List(DriveQuery),
    Get(String),
    Download(String),
    Delete(String),
}

/// Operation kinds that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Create,
    List,
    Get,
    Download,
    Delete,
}

#[derive(Debug, Clone)]
struct StoredFile {
    meta: RemoteFile,
    data: Bytes,
}

/// In-memory remote store.
///
/// Keeps files in insertion order, records every call, and can be told to
/// fail specific operations. Useful for testing the gateway without a
/// network. All data is lost on drop.
pub struct MemoryStore {
    files: RwLock<Vec<StoredFile>>,
    calls: Mutex<Vec<StoreCall>>,
    failing: RwLock<HashSet<StoreOp>>,
    break_downloads: RwLock<bool>,
    open_downloads: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            files: RwLock::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            failing: RwLock::new(HashSet::new()),
            break_downloads: RwLock::new(false),
            open_downloads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Seed a file without recording a call.
    pub async fn insert(
        &self,
        name: &str,
        mime_type: &str,
        parent: &FolderId,
        data: impl Into<Bytes>,
    ) -> RemoteFile {
        let meta = new_meta(name, mime_type, parent);
        self.files.write().await.push(StoredFile {
            meta: meta.clone(),
            data: data.into(),
        });
        meta
    }

    /// Calls made so far.
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().await.clone()
    }

    /// Number of files currently stored.
    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }

    /// Make every future call of `op` fail with a network error.
    pub async fn fail(&self, op: StoreOp) {
        self.failing.write().await.insert(op);
    }

    /// Make downloads emit the first half of the content, then fail.
    pub async fn break_downloads_midway(&self) {
        *self.break_downloads.write().await = true;
    }

    /// Download streams handed out and not yet dropped.
    pub fn open_downloads(&self) -> usize {
        self.open_downloads.load(Ordering::SeqCst)
    }

    async fn record(&self, call: StoreCall, op: StoreOp) -> Result<()> {
        self.calls.lock().await.push(call);
        if self.failing.read().await.contains(&op) {
            return Err(Error::Network(format!("injected {:?} failure", op)));
        }
        Ok(())
    }

    async fn find(&self, id: &FileId) -> Result<StoredFile> {
        self.files
            .read()
            .await
            .iter()
            .find(|f| f.meta.id == id.as_str())
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("File not found: {}", id)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn new_meta(name: &str, mime_type: &str, parent: &FolderId) -> RemoteFile {
    let id = Uuid::new_v4().simple().to_string();
    RemoteFile {
        web_view_link: Some(format!(
            "https://drive.google.com/file/d/{}/view?usp=drivesdk",
            id
        )),
        id,
        name: name.to_string(),
        mime_type: Some(mime_type.to_string()),
        parents: vec![parent.as_str().to_string()],
    }
}

/// Download stream that decrements the open-stream counter when dropped.
struct TrackedStream {
    inner: ByteStream,
    open: Arc<AtomicUsize>,
}

impl Stream for TrackedStream {
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().inner.as_mut().poll_next(cx)
    }
}

impl Drop for TrackedStream {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn create(&self, file: NewFile) -> Result<RemoteFile> {
        self.record(
            StoreCall::Create {
                name: file.name.clone(),
                parent: file.parent.as_str().to_string(),
            },
            StoreOp::Create,
        )
        .await?;

        let meta = new_meta(&file.name, &file.mime_type, &file.parent);
        self.files.write().await.push(StoredFile {
            meta: meta.clone(),
            data: file.content,
        });

        Ok(meta)
    }

    async fn list(&self, query: &DriveQuery) -> Result<Vec<RemoteFile>> {
        self.record(StoreCall::List(query.clone()), StoreOp::List)
            .await?;

        Ok(self
            .files
            .read()
            .await
            .iter()
            .filter(|f| query.matches(&f.meta))
            .map(|f| f.meta.clone())
            .collect())
    }

    async fn get(&self, id: &FileId) -> Result<RemoteFile> {
        self.record(StoreCall::Get(id.to_string()), StoreOp::Get)
            .await?;
        Ok(self.find(id).await?.meta)
    }

    async fn download(&self, id: &FileId) -> Result<DownloadStream> {
        self.record(StoreCall::Download(id.to_string()), StoreOp::Download)
            .await?;
        let file = self.find(id).await?;

        let data = file.data;
        let mut chunks: Vec<Result<Bytes>> = if *self.break_downloads.read().await {
            vec![
                Ok(data.slice(..data.len() / 2)),
                Err(Error::Network("connection reset mid-transfer".to_string())),
            ]
        } else {
            (0..data.len())
                .step_by(DOWNLOAD_CHUNK)
                .map(|start| Ok(data.slice(start..(start + DOWNLOAD_CHUNK).min(data.len()))))
                .collect()
        };
        chunks.retain(|c| !matches!(c, Ok(b) if b.is_empty()));

        self.open_downloads.fetch_add(1, Ordering::SeqCst);
        let body = TrackedStream {
            inner: Box::pin(stream::iter(chunks)),
            open: self.open_downloads.clone(),
        };

        Ok(DownloadStream {
            content_type: file
                .meta
                .mime_type
                .unwrap_or_else(|| crate::provider::DEFAULT_MIME_TYPE.to_string()),
            content_length: Some(data.len() as u64),
            body: Box::pin(body),
        })
    }

    async fn delete(&self, id: &FileId) -> Result<()> {
        self.record(StoreCall::Delete(id.to_string()), StoreOp::Delete)
            .await?;

        let mut files = self.files.write().await;
        let index = files
            .iter()
            .position(|f| f.meta.id == id.as_str())
            .ok_or_else(|| Error::NotFound(format!("File not found: {}", id)))?;
        files.remove(index);
        Ok(())
    }
}
