//! File upload and download handlers.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;

use websharex_core::error::AppError;
use websharex_core::types::EntryId;
use websharex_service::UploadFile;

use crate::dto::response::{ApiResponse, DownloadUrlResponse, EntryResponse, entry_list};
use crate::error::ApiError;
use crate::extractors::parse_entry_id;
use crate::state::AppState;

/// POST /api/rooms/{room}/files: multipart upload
///
/// Accepts an optional `parent_id` text field and any number of `file`
/// fields. Every file lands in the same folder.
pub async fn upload_files(
    State(state): State<AppState>,
    Path(room): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<Vec<EntryResponse>>>), ApiError> {
    let mut parent: Option<EntryId> = None;
    let mut files: Vec<UploadFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "parent_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                let text = text.trim();
                parent = if text.is_empty() {
                    None
                } else {
                    Some(parse_entry_id(text)?)
                };
            }
            "file" | "files" => {
                let name = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::validation("File field is missing a file name"))?;
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                files.push(UploadFile {
                    name,
                    content_type,
                    data,
                });
            }
            _ => {}
        }
    }

    if files.is_empty() {
        return Err(AppError::validation("At least one file is required").into());
    }

    let stored = state.entry_service.upload(&room, parent, files).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(entry_list(&stored))),
    ))
}

/// GET /api/rooms/{room}/entries/{id}/download
pub async fn download_url(
    State(state): State<AppState>,
    Path((room, id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<DownloadUrlResponse>>, ApiError> {
    let id = parse_entry_id(&id)?;
    let url = state.entry_service.download_url(&room, id).await?;
    Ok(Json(ApiResponse::ok(DownloadUrlResponse { url })))
}
