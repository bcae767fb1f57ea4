//! `POST /upload/file`: upload a file, replacing one with the same name.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use tracing::{info, warn};

use drivegate_common::FolderId;
use drivegate_storage::{DriveQuery, NewFile, RemoteFile, RemoteStore, DEFAULT_MIME_TYPE};

use super::{
    Envelope, FileSummary, MSG_DELETE_FAILED, MSG_LIST_FAILED, MSG_METADATA_FAILED,
    MSG_READ_FILE_FAILED, MSG_UPLOAD_FAILED,
};
use crate::config::ReplaceScope;
use crate::error::ApiError;
use crate::server::AppState;

/// The uploaded file part, fully buffered.
#[derive(Debug)]
struct UploadedPart {
    file_name: String,
    content_type: String,
    data: Bytes,
}

/// Fields of the upload form; the first `folder` and `file` parts win.
#[derive(Debug, Default)]
struct UploadForm {
    folder: Option<String>,
    file: Option<UploadedPart>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(read_error)? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("folder") if form.folder.is_none() => {
                    form.folder = Some(field.text().await.map_err(read_error)?);
                }
                Some("file") if form.file.is_none() => {
                    // A part without a filename is a plain value, not a file.
                    let Some(file_name) = field.file_name().filter(|n| !n.is_empty()).map(str::to_owned)
                    else {
                        continue;
                    };
                    let content_type = field.content_type().unwrap_or(DEFAULT_MIME_TYPE).to_owned();
                    let data = field.bytes().await.map_err(read_error)?;
                    form.file = Some(UploadedPart {
                        file_name,
                        content_type,
                        data,
                    });
                }
                _ => {}
            }
        }

        Ok(form)
    }
}

fn read_error(err: MultipartError) -> ApiError {
    let status = match err.status() {
        StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    };
    ApiError::new(status, MSG_READ_FILE_FAILED).with_detail(err.body_text())
}

pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Envelope<FileSummary>>, ApiError> {
    let multipart = multipart
        .map_err(|e| ApiError::bad_request(MSG_READ_FILE_FAILED).with_detail(e.body_text()))?;

    let form = UploadForm::read(multipart).await?;
    let folder = FolderId::new(form.folder.unwrap_or_default())?;
    let part = form
        .file
        .ok_or_else(|| ApiError::bad_request(MSG_READ_FILE_FAILED))?;

    let file = replace_upload(state.store.as_ref(), state.replace_scope, folder, part).await?;

    Ok(Json(Envelope::new("File successfully uploaded", file.into())))
}

/// Delete the first same-named file, create the new one, then re-fetch it
/// for its shareable link.
///
/// Steps run strictly in order and the first failure aborts. If the delete
/// succeeds and the create fails, the previous file is gone.
async fn replace_upload(
    store: &dyn RemoteStore,
    scope: ReplaceScope,
    folder: FolderId,
    part: UploadedPart,
) -> Result<RemoteFile, ApiError> {
    let query = match scope {
        ReplaceScope::Folder => DriveQuery::NameInFolder {
            name: part.file_name.clone(),
            folder: folder.clone(),
        },
        ReplaceScope::Global => DriveQuery::NameEquals(part.file_name.clone()),
    };

    let replaced = store
        .find_first(&query)
        .await
        .map_err(|e| ApiError::upstream(MSG_LIST_FAILED, e))?;
    if let Some(old) = &replaced {
        let old_id = old
            .file_id()
            .map_err(|e| ApiError::upstream(MSG_DELETE_FAILED, e))?;
        store
            .delete(&old_id)
            .await
            .map_err(|e| ApiError::upstream(MSG_DELETE_FAILED, e))?;
        info!(file_id = %old_id, name = %old.name, "Deleted same-named file before upload");
    }

    let created = store
        .create(NewFile {
            name: part.file_name,
            mime_type: part.content_type,
            parent: folder,
            content: part.data,
        })
        .await
        .map_err(|e| {
            if let Some(old) = &replaced {
                warn!(replaced_id = %old.id, name = %old.name, "Upload failed after deleting the previous file");
            }
            ApiError::upstream(MSG_UPLOAD_FAILED, e)
        })?;

    let created_id = created
        .file_id()
        .map_err(|e| ApiError::upstream(MSG_METADATA_FAILED, e))?;

    let file = store
        .get(&created_id)
        .await
        .map_err(|e| ApiError::upstream(MSG_METADATA_FAILED, e))?;

    info!(file_id = %file.id, name = %file.name, replaced = replaced.is_some(), "File uploaded");
    Ok(file)
}
