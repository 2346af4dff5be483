//! Upload handlers: CSV imports and the forecast endpoint.
//!
//! Uploaded files land in the configured scratch directory under a
//! generated UUID, so two uploads with the same original filename can
//! never clobber each other. The forecast pipeline then reads the saved
//! file and runs to completion within the request.

use super::AppState;
use crate::core::ingest::ImportReport;
use crate::errors::{Error, Result};
use crate::forecast::ForecastReport;
use axum::{Json, extract::Multipart, extract::State};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct InventoryUploadResponse {
    pub imported: usize,
    pub message: String,
}

/// Pulls the first file field out of a multipart request.
async fn read_upload(multipart: &mut Multipart) -> Result<Vec<u8>> {
    while let Some(field) = multipart.next_field().await.map_err(|e| Error::InvalidInput {
        message: format!("Malformed multipart request: {e}"),
    })? {
        if field.file_name().is_some() {
            let bytes = field.bytes().await.map_err(|e| Error::InvalidInput {
                message: format!("Failed to read uploaded file: {e}"),
            })?;
            if bytes.is_empty() {
                break;
            }
            return Ok(bytes.to_vec());
        }
    }
    Err(Error::InvalidInput {
        message: "No file selected".to_string(),
    })
}

pub async fn upload_inventory(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<InventoryUploadResponse>> {
    let bytes = read_upload(&mut multipart).await?;
    let imported = crate::core::ingest::import_inventory(&state.db, bytes.as_slice()).await?;
    Ok(Json(InventoryUploadResponse {
        imported,
        message: "Inventory uploaded successfully".to_string(),
    }))
}

pub async fn upload_orders(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportReport>> {
    let bytes = read_upload(&mut multipart).await?;
    let report = crate::core::ingest::import_orders(&state.db, bytes.as_slice()).await?;
    Ok(Json(report))
}

/// Saves an upload to the scratch dir under a fresh UUID, never the
/// client's filename.
async fn save_upload(state: &AppState, bytes: &[u8]) -> Result<std::path::PathBuf> {
    let path = state
        .settings
        .upload_dir
        .join(format!("{}.csv", Uuid::new_v4()));
    tokio::fs::write(&path, bytes).await?;
    info!(path = %path.display(), "Saved historical orders upload");
    Ok(path)
}

pub async fn run_forecast(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ForecastReport>> {
    let bytes = read_upload(&mut multipart).await?;
    let path = save_upload(&state, &bytes).await?;

    // Single-shot, synchronous: the pipeline runs to completion here
    let report = crate::forecast::run_forecast(&path)?;
    Ok(Json(report))
}

pub async fn run_learned_forecast(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Vec<crate::forecast::predict::StockPrediction>>> {
    let bytes = read_upload(&mut multipart).await?;
    let path = save_upload(&state, &bytes).await?;

    // Learned mode was asked for explicitly; a missing artifact is an
    // error here, never a heuristic fallback
    let predictions = crate::forecast::score_with_model(&path, &state.settings.model_path)?;
    Ok(Json(predictions))
}
