//! `GET /list?folder=ID`

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Serialize;
use tracing::debug;

use drivegate_common::FolderId;
use drivegate_storage::{DriveQuery, RemoteFile};

use super::{Envelope, MSG_LIST_FAILED};
use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Default)]
pub struct ListParams {
    pub folder: Option<String>,
}

impl ListParams {
    /// The first `folder` value wins when the parameter is repeated.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self {
            folder: pairs
                .into_iter()
                .find(|(key, _)| key == "folder")
                .map(|(_, value)| value),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FolderListing {
    pub folder_id: String,
    pub files: Vec<RemoteFile>,
}

pub async fn list_files(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Envelope<FolderListing>>, ApiError> {
    let Query(pairs) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let params = ListParams::from_pairs(pairs);
    let folder = FolderId::new(params.folder.unwrap_or_default())?;

    let files = state
        .store
        .list(&DriveQuery::InParents(folder.clone()))
        .await
        .map_err(|e| ApiError::upstream(MSG_LIST_FAILED, e))?;

    debug!(folder = %folder, count = files.len(), "Listed folder");

    Ok(Json(Envelope::new(
        "Files successfully retrieved",
        FolderListing {
            folder_id: folder.to_string(),
            files,
        },
    )))
}
