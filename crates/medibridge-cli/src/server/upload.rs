use axum::body::Bytes;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use medibridge_core::staging::{validate_upload_name, UploadReceipt};
use medibridge_core::BridgeError;
use std::io::{Seek, SeekFrom, Write};
use tempfile::SpooledTempFile;

use super::error::{blocking, ApiError};
use super::AppState;

/// Parts up to this size stay in memory; larger ones roll over to disk.
const SPOOL_IN_MEMORY: usize = 1024 * 1024;

/// `POST /api/archivos/copiar` (multipart: `file`, `dest_name`, `dest_dir`)
pub async fn copy_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadReceipt>, ApiError> {
    let mut spool: Option<SpooledTempFile> = None;
    let mut dest_name: Option<String> = None;
    let mut dest_dir: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => spool = Some(spool_field(field).await?),
            "dest_name" => {
                let value = field.text().await.map_err(multipart_error)?;
                // Fail fast when the name arrives before the body.
                if spool.is_none() {
                    validate_upload_name(&value)?;
                }
                dest_name = Some(value);
            }
            "dest_dir" => dest_dir = Some(field.text().await.map_err(multipart_error)?),
            other => tracing::debug!(field = other, "ignoring unknown multipart field"),
        }
    }

    let mut spool = spool.ok_or_else(|| BridgeError::invalid("missing multipart field 'file'"))?;
    let dest_name = dest_name.ok_or_else(|| BridgeError::invalid("missing multipart field 'dest_name'"))?;

    let stager = state.stager.clone();
    let staged = blocking(move || {
        spool
            .seek(SeekFrom::Start(0))
            .map_err(|e| BridgeError::filesystem("error buffering upload", e))?;
        stager.stage(&mut spool, &dest_name, dest_dir.as_deref())
    })
    .await?;
    Ok(Json(UploadReceipt::from(&staged)))
}

/// Buffer the file part. Writes that may touch disk run on the blocking pool.
async fn spool_field(mut field: Field<'_>) -> Result<SpooledTempFile, ApiError> {
    let mut tmp = SpooledTempFile::new(SPOOL_IN_MEMORY);
    let mut buffered = 0usize;
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        buffered += chunk.len();
        if tmp.is_rolled() || buffered > SPOOL_IN_MEMORY {
            tmp = blocking(move || write_chunk(tmp, &chunk)).await?;
        } else {
            tmp = write_chunk(tmp, &chunk)?;
        }
    }
    Ok(tmp)
}

fn write_chunk(mut tmp: SpooledTempFile, chunk: &Bytes) -> Result<SpooledTempFile, BridgeError> {
    tmp.write_all(chunk)
        .map_err(|e| BridgeError::filesystem("error buffering upload", e))?;
    Ok(tmp)
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError(BridgeError::PayloadTooLarge(format!(
            "upload exceeds the size limit: {}",
            e.body_text()
        )));
    }
    ApiError(BridgeError::invalid(format!("malformed multipart body: {}", e.body_text())))
}
