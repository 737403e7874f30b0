// src/handlers/upload.rs
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::dtos::upload::UploadResponse;
use crate::error::AppError;
use crate::state::AppState;

// POST /upload - multipart form, field "file"; stored with a timestamp prefix
// so repeated uploads of the same filename never collide
pub async fn upload_file(
    State(AppState { upload_dir, .. }): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(&format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "upload.bin".to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(&format!("Failed to read upload: {e}")))?;

        let filename = format!("{}-{}", Utc::now().timestamp_millis(), original_name);

        tokio::fs::create_dir_all(&upload_dir)
            .await
            .map_err(|e| AppError::internal(&format!("Failed to create upload dir: {e}")))?;

        let target = upload_dir.join(&filename);
        tokio::fs::write(&target, &data)
            .await
            .map_err(|e| AppError::internal(&format!("Failed to store upload: {e}")))?;

        tracing::info!(%filename, size = data.len(), "File uploaded");

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                message: "File uploaded successfully".to_string(),
                filename: filename.clone(),
                path: format!("/uploads/{filename}"),
                url: format!("/uploads/{filename}"),
            }),
        ));
    }

    Err(AppError::validation("No file uploaded"))
}
