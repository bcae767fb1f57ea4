//! Google Drive API client.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

use drivegate_common::{Error, FileId, Result};

use super::auth::TokenManager;
use crate::provider::{DownloadStream, NewFile, RemoteFile, RemoteStore, DEFAULT_MIME_TYPE};
use crate::query::DriveQuery;

/// Google Drive API base URL.
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
/// Google Drive upload API base URL.
pub const DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// Fields requested for a single file.
const FILE_FIELDS: &str = "id,name,mimeType,parents,webViewLink";
/// Fields requested for each page of a listing.
const LIST_FIELDS: &str = "nextPageToken,files(id,name,mimeType,parents,webViewLink)";
const PAGE_SIZE: &str = "1000";
/// Page size when only the first match is wanted.
const FIRST_MATCH_PAGE_SIZE: &str = "1";

/// Response from listing files.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    #[serde(default)]
    files: Vec<RemoteFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Google Drive API client.
pub struct DriveClient {
    http: Client,
    token_manager: Arc<TokenManager>,
    api_base: Url,
    upload_base: Url,
}

impl DriveClient {
    /// Create a new Drive client against the public Google endpoints.
    pub fn new(http: Client, token_manager: Arc<TokenManager>) -> Self {
        Self {
            http,
            token_manager,
            api_base: Url::parse(DRIVE_API_BASE).expect("static API URL is valid"),
            upload_base: Url::parse(DRIVE_UPLOAD_BASE).expect("static upload URL is valid"),
        }
    }

    /// Point the client at different API endpoints.
    ///
    /// # Errors
    /// - Either base is not an absolute URL that can carry a path
    pub fn with_endpoints(mut self, api_base: &str, upload_base: &str) -> Result<Self> {
        self.api_base = parse_base(api_base)?;
        self.upload_base = parse_base(upload_base)?;
        Ok(self)
    }

    /// Token manager shared by every request this client makes.
    pub fn token_manager(&self) -> &Arc<TokenManager> {
        &self.token_manager
    }

    /// Get authorization header.
    async fn auth_header(&self) -> Result<String> {
        let token = self.token_manager.get_access_token().await?;
        Ok(format!("Bearer {}", token.secret()))
    }

    /// Fetch one page of a listing.
    async fn list_page(
        &self,
        query: &str,
        page_size: &str,
        page_token: Option<&str>,
    ) -> Result<FileListResponse> {
        let url = endpoint(&self.api_base, &["files"])?;
        let auth = self.auth_header().await?;

        let mut request = self
            .http
            .get(url)
            .header(header::AUTHORIZATION, auth)
            .query(&[("q", query), ("fields", LIST_FIELDS), ("pageSize", page_size)]);

        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to list files: {}", e)))?;

        self.handle_response(response).await
    }

    /// Follow `nextPageToken` until the pages run out or `limit` files are
    /// collected. A token seen twice is an upstream fault, not a new page.
    async fn collect_pages(
        &self,
        query: &str,
        page_size: &str,
        limit: Option<usize>,
    ) -> Result<Vec<RemoteFile>> {
        let mut files = Vec::new();
        let mut seen = HashSet::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .list_page(query, page_size, page_token.as_deref())
                .await?;
            files.extend(page.files);

            if let Some(limit) = limit {
                if files.len() >= limit {
                    files.truncate(limit);
                    break;
                }
            }

            match page.next_page_token {
                Some(token) if !seen.insert(token.clone()) => {
                    return Err(Error::Network(format!(
                        "Drive repeated page token {}",
                        token
                    )));
                }
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(files)
    }

    /// Handle API response with error checking.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        self.check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| Error::Network(format!("Failed to parse response: {}", e)))
    }

    /// Map non-success statuses onto the common error type.
    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else if status == StatusCode::NOT_FOUND {
            Err(Error::NotFound("Resource not found".to_string()))
        } else if status == StatusCode::UNAUTHORIZED {
            // A revoked or rotated token; mint a new one on the next call.
            self.token_manager.invalidate().await;
            Err(Error::Authentication(
                "Invalid or expired token".to_string(),
            ))
        } else if status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            Err(Error::PermissionDenied(format!("Access denied: {}", body)))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Error::Network(format!("API error: {} - {}", status, body)))
        }
    }
}

fn parse_base(base: &str) -> Result<Url> {
    let url = Url::parse(base)
        .map_err(|e| Error::InvalidInput(format!("Invalid API base URL {}: {}", base, e)))?;
    if url.cannot_be_a_base() {
        return Err(Error::InvalidInput(format!(
            "API base URL cannot carry a path: {}",
            base
        )));
    }
    Ok(url)
}

/// Append percent-encoded path segments to a base URL.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::InvalidInput(format!("Invalid API base URL: {}", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Build a `multipart/related` body: JSON metadata followed by the content.
fn multipart_related(
    boundary: &str,
    metadata: &serde_json::Value,
    mime_type: &str,
    content: &[u8],
) -> Result<Vec<u8>> {
    let metadata_json = serde_json::to_vec(metadata)?;
    let mut body = Vec::with_capacity(content.len() + metadata_json.len() + 256);

    // Metadata part
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(&metadata_json);
    body.extend_from_slice(b"\r\n");

    // Data part
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", mime_type).as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(b"\r\n");

    // End boundary
    body.extend_from_slice(format!("--{}--", boundary).as_bytes());

    Ok(body)
}

#[async_trait]
impl RemoteStore for DriveClient {
    fn name(&self) -> &str {
        "gdrive"
    }

    async fn create(&self, file: NewFile) -> Result<RemoteFile> {
        let url = endpoint(&self.upload_base, &["files"])?;
        let auth = self.auth_header().await?;

        let metadata = serde_json::json!({
            "name": file.name,
            "mimeType": file.mime_type,
            "parents": [file.parent.as_str()]
        });

        let boundary = format!("drivegate-{}", Uuid::new_v4().simple());
        let body = multipart_related(&boundary, &metadata, &file.mime_type, &file.content)?;

        tracing::debug!(name = %file.name, parent = %file.parent, bytes = file.content.len(), "Creating file");

        let response = self
            .http
            .post(url)
            .header(header::AUTHORIZATION, auth)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .query(&[("uploadType", "multipart"), ("fields", FILE_FIELDS)])
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to upload file: {}", e)))?;

        self.handle_response(response).await
    }

    async fn list(&self, query: &DriveQuery) -> Result<Vec<RemoteFile>> {
        let q = query.render();
        let files = self.collect_pages(&q, PAGE_SIZE, None).await?;

        tracing::debug!(query = %q, count = files.len(), "Listed files");
        Ok(files)
    }

    async fn find_first(&self, query: &DriveQuery) -> Result<Option<RemoteFile>> {
        let q = query.render();
        let first = self
            .collect_pages(&q, FIRST_MATCH_PAGE_SIZE, Some(1))
            .await?
            .into_iter()
            .next();

        tracing::debug!(query = %q, found = first.is_some(), "Looked up first match");
        Ok(first)
    }

    async fn get(&self, id: &FileId) -> Result<RemoteFile> {
        let url = endpoint(&self.api_base, &["files", id.as_str()])?;
        let auth = self.auth_header().await?;

        let response = self
            .http
            .get(url)
            .header(header::AUTHORIZATION, auth)
            .query(&[("fields", FILE_FIELDS)])
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to get file: {}", e)))?;

        self.handle_response(response).await
    }

    async fn download(&self, id: &FileId) -> Result<DownloadStream> {
        let url = endpoint(&self.api_base, &["files", id.as_str()])?;
        let auth = self.auth_header().await?;

        let response = self
            .http
            .get(url)
            .header(header::AUTHORIZATION, auth)
            .query(&[("alt", "media")])
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to start download: {}", e)))?;

        let response = self.check_status(response).await?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();
        let content_length = response.content_length();

        let body = response
            .bytes_stream()
            .map(|result| result.map_err(|e| Error::Network(format!("Stream read error: {}", e))));

        Ok(DownloadStream {
            content_type,
            content_length,
            body: Box::pin(body),
        })
    }

    async fn delete(&self, id: &FileId) -> Result<()> {
        let url = endpoint(&self.api_base, &["files", id.as_str()])?;
        let auth = self.auth_header().await?;

        let response = self
            .http
            .delete(url)
            .header(header::AUTHORIZATION, auth)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to delete file: {}", e)))?;

        self.check_status(response).await?;
        tracing::debug!(file_id = %id, "Deleted file");
        Ok(())
    }
}
