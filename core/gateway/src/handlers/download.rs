//! `GET /download/{file_id}`: stream file content through.

use axum::{
    body::Body,
    extract::{rejection::PathRejection, Path, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use futures::TryStreamExt;
use tracing::{debug, error};

use drivegate_common::FileId;
use drivegate_storage::DEFAULT_MIME_TYPE;

use super::MSG_DOWNLOAD_FAILED;
use crate::error::ApiError;
use crate::server::AppState;

/// The upstream stream moves into the response body, so it is dropped
/// when the transfer ends, fails or the client goes away.
pub async fn download_file(
    State(state): State<AppState>,
    file_id: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(file_id) = file_id.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let file_id = FileId::new(file_id)?;

    let download = state
        .store
        .download(&file_id)
        .await
        .map_err(|e| ApiError::upstream(MSG_DOWNLOAD_FAILED, e))?;

    let mut headers = HeaderMap::new();
    let content_type = HeaderValue::from_str(&download.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_MIME_TYPE));
    headers.insert(header::CONTENT_TYPE, content_type);
    if let Some(len) = download.content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    }

    debug!(file_id = %file_id, content_type = %download.content_type, "Streaming download");

    let id = file_id.to_string();
    let body = download.body.inspect_err(move |e| {
        error!(file_id = %id, error = %e, "Download aborted mid-transfer");
    });

    Ok((headers, Body::from_stream(body)).into_response())
}
