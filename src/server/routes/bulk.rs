//! Bulk export and import handlers.

use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    Json,
    body::{Body, Bytes},
    extract::{Multipart, State, multipart::MultipartRejection},
    http::header,
    response::{IntoResponse, Response},
};
use axum_extra::response::Attachment;
use futures::Stream;
use serde::Serialize;
use tempfile::{NamedTempFile, TempPath};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::transfer::{self, EXPORT_FILE_NAME};

use super::super::{error::ApiError, state::AppState};

/// Multipart field carrying the document to import.
pub const UPLOAD_FIELD: &str = "file";

/// Confirmation of an import.
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub message: &'static str,
    pub imported: usize,
}

/// Streams a temporary file and deletes it once the stream is dropped,
/// whether it ran to completion or the client went away.
struct TempFileStream {
    inner: ReaderStream<tokio::fs::File>,
    _path: TempPath,
}

impl TempFileStream {
    fn new(file: std::fs::File, path: TempPath) -> Self {
        Self {
            inner: ReaderStream::new(tokio::fs::File::from_std(file)),
            _path: path,
        }
    }
}

impl Stream for TempFileStream {
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// Download the whole store as `database.json`.
pub async fn download(State(state): State<AppState>) -> Result<Response, ApiError> {
    let temp_dir = state.temp_dir().map(Path::to_path_buf);
    let export = state
        .store()
        .blocking(move |store| transfer::export_to_temp(store, temp_dir.as_deref()))
        .await?;

    info!(
        entries = export.entries(),
        bytes = export.len(),
        "streaming export"
    );

    let len = export.len();
    let (file, path) = export.into_parts();
    let body = Body::from_stream(TempFileStream::new(file, path));

    let attachment = Attachment::new(body)
        .filename(EXPORT_FILE_NAME)
        .content_type("application/json");

    Ok(([(header::CONTENT_LENGTH, len.to_string())], attachment).into_response())
}

/// Import a JSON object uploaded in the `file` multipart field.
///
/// Entries are applied one by one; a failure stops the import without
/// undoing what was already written. The staged upload is deleted in every
/// case.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImportResponse>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| ApiError::upload(rejection.body_text()))?;
    let staged = stage_upload(&mut multipart, state.temp_dir()).await?;
    debug!(path = %staged.path().display(), "upload staged");

    let report = state
        .store()
        .blocking(move |store| transfer::import_upload(store, staged))
        .await?;

    Ok(Json(ImportResponse {
        message: "Data imported successfully",
        imported: report.imported,
    }))
}

/// Copy the upload field into a temporary file.
///
/// Dropping the returned file deletes it, so any early return here cleans
/// up after itself.
async fn stage_upload(
    multipart: &mut Multipart,
    temp_dir: Option<&Path>,
) -> Result<NamedTempFile, ApiError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::upload(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            // Ignore unknown fields
            continue;
        }

        let staged = create_temp(temp_dir)
            .map_err(|e| ApiError::upload(format!("Failed to create temp file: {}", e)))?;
        let handle = staged
            .as_file()
            .try_clone()
            .map_err(|e| ApiError::upload(format!("Failed to open temp file: {}", e)))?;
        let mut file = tokio::fs::File::from_std(handle);

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| ApiError::upload(e.to_string()))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| ApiError::upload(format!("Failed to write temp file: {}", e)))?;
        }
        file.flush()
            .await
            .map_err(|e| ApiError::upload(format!("Failed to write temp file: {}", e)))?;

        return Ok(staged);
    }

    Err(ApiError::missing_field(UPLOAD_FIELD))
}

fn create_temp(dir: Option<&Path>) -> std::io::Result<NamedTempFile> {
    match dir {
        Some(dir) => NamedTempFile::new_in(dir),
        None => NamedTempFile::new(),
    }
}
