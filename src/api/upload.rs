use std::path::Path;

use axum::extract::Multipart;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AppError;
use crate::storage::client::StorageClient;

/// URL prefix under which uploaded files are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Response from a successful upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    /// Generated file name inside the upload root.
    pub filename: String,
    /// The URL path where the file can be accessed.
    pub url: String,
}

/// Build a unique file name: UTC timestamp, random suffix, and the original
/// extension when it is a plain alphanumeric one.
pub fn generate_upload_name(original_name: &str, now: DateTime<Utc>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();

    format!(
        "{}_{}{}",
        now.format("%Y%m%d_%H%M%S"),
        &suffix[..8],
        extension
    )
}

/// Core upload logic, separated from the HTTP layer for testability.
pub async fn save_upload(
    storage: &dyn StorageClient,
    original_name: &str,
    data: Vec<u8>,
) -> Result<UploadResponse, AppError> {
    let filename = generate_upload_name(original_name, Utc::now());
    let size = data.len();
    storage.put_object(&filename, data).await?;
    tracing::info!("Stored upload '{}' as {} ({} bytes)", original_name, filename, size);

    Ok(UploadResponse {
        url: format!("{UPLOADS_URL_PREFIX}/{filename}"),
        filename,
    })
}

/// Pull the field named "file" out of a multipart form.
///
/// Returns the client-side file name and the raw bytes.
pub async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Vec<u8>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload.bin").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file: {e}")))?;

        return Ok((file_name, data.to_vec()));
    }

    Err(AppError::BadRequest("No file field found in request".into()))
}

/// Axum handler for `POST /api/v1/upload`.
///
/// Accepts a multipart form with a single file field named "file".
pub async fn upload_handler(
    axum::extract::State(state): axum::extract::State<crate::app::AppState>,
    mut multipart: Multipart,
) -> Result<axum::Json<UploadResponse>, AppError> {
    let (file_name, data) = read_file_field(&mut multipart).await?;
    let response = save_upload(state.storage_client.as_ref(), &file_name, data).await?;
    Ok(axum::Json(response))
}
