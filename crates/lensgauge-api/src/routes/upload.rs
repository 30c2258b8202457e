//! Upload form and measurement handler.

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::response::Html;
use lensgauge_core::storage::sanitize_extension;
use lensgauge_core::{Measurement, UploadSlot, UploadStore, process_image};

use crate::pages::{index_page, result_page};
use crate::{ApiError, AppState, Result};

/// Name of the multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

/// `GET /`
pub async fn index() -> Html<String> {
    index_page()
}

/// `POST /`
///
/// A body that is not `multipart/form-data` carries no file part.
pub async fn submit(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Html<String>> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(%rejection, "POST without a multipart body");
        ApiError::MissingFilePart
    })?;
    let (filename, bytes) = read_file_field(&mut multipart).await?;
    let ext = sanitize_extension(&filename);
    tracing::info!(ext = %ext, bytes = bytes.len(), "Upload received");

    let worker = state.clone();
    let (slot, measurement) =
        tokio::task::spawn_blocking(move || store_and_process(&worker, &ext, &bytes)).await??;

    let url = UploadStore::result_url(slot.id());
    tracing::info!(upload_id = %slot.id(), diameter = measurement.diameter, "Upload processed");
    Ok(result_page(&measurement, &url))
}

/// Pull the `file` field out of the form.
///
/// Parts named `file` without a filename are not file uploads and are
/// skipped. An empty filename means the form was submitted with nothing
/// selected; that is rejected before the body is read.
async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Bytes)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = match field.file_name() {
            None => continue,
            Some("") => return Err(ApiError::NoSelectedFile),
            Some(name) => name.to_string(),
        };
        let bytes = field.bytes().await?;
        return Ok((filename, bytes));
    }
    Err(ApiError::MissingFilePart)
}

fn store_and_process(
    state: &AppState,
    ext: &str,
    bytes: &[u8],
) -> lensgauge_core::Result<(UploadSlot, Measurement)> {
    let slot = state.store.create_slot()?;
    let outcome = slot
        .write_upload(ext, bytes)
        .and_then(|upload| process_image(&upload, &slot.result_path(), &state.config, &state.style));

    match outcome {
        Ok(measurement) => Ok((slot, measurement)),
        Err(e) => {
            if let Err(cleanup) = std::fs::remove_dir_all(slot.dir()) {
                tracing::warn!(
                    upload_id = %slot.id(),
                    "Failed to remove slot after error: {cleanup}"
                );
            }
            Err(e)
        }
    }
}
