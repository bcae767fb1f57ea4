//! `POST /file/metadata`: look a file up by id or by name.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderMap},
    Json,
};
use serde::Deserialize;

use drivegate_common::FileLookup;
use drivegate_storage::{DriveQuery, RemoteFile, RemoteStore};

use super::{Envelope, FileSummary, MSG_LIST_FAILED, MSG_METADATA_FAILED};
use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct MetadataRequest {
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

const MSG_INVALID_BODY: &str = "Invalid request body";

impl MetadataRequest {
    /// Parse a request body. An empty body is an empty request, whatever
    /// its content type; anything else must be JSON.
    fn parse(headers: &HeaderMap, body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let is_json = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|mime| {
                let mime = mime.trim();
                mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
            })
            .unwrap_or(false);
        if !is_json {
            return Err(ApiError::bad_request(MSG_INVALID_BODY)
                .with_detail("expected Content-Type: application/json"));
        }

        Json::<Self>::from_bytes(body)
            .map(|Json(request)| request)
            .map_err(|e| ApiError::bad_request(MSG_INVALID_BODY).with_detail(e.body_text()))
    }
}

pub async fn file_metadata(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Envelope<FileSummary>>, ApiError> {
    let body = body
        .map_err(|e| ApiError::new(e.status(), MSG_INVALID_BODY).with_detail(e.body_text()))?;
    let request = MetadataRequest::parse(&headers, &body)?;

    let lookup = FileLookup::from_parts(request.file_id, request.file_name)?;
    let file = resolve(state.store.as_ref(), lookup).await?;

    Ok(Json(Envelope::new(
        "File metadata successfully retrieved",
        file.into(),
    )))
}

/// Lookup by name takes the first match; by id, any failure is upstream.
async fn resolve(
    store: &dyn RemoteStore,
    lookup: FileLookup,
) -> Result<RemoteFile, ApiError> {
    match lookup {
        FileLookup::ById(id) => store
            .get(&id)
            .await
            .map_err(|e| ApiError::upstream(MSG_METADATA_FAILED, e)),
        FileLookup::ByName(name) => store
            .find_first(&DriveQuery::NameEquals(name))
            .await
            .map_err(|e| ApiError::upstream(MSG_LIST_FAILED, e))?
            .ok_or_else(|| ApiError::not_found("File not found")),
    }
}
