//! Entry tree handlers: listing, folders, rename, delete.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::dto::request::{CreateFolderRequest, RenameEntryRequest};
use crate::dto::response::{
    ApiResponse, DeleteResponse, EntryResponse, RenameResponse, entry_list,
};
use crate::error::ApiError;
use crate::extractors::parse_entry_id;
use crate::state::AppState;

/// GET /api/rooms/{room}/entries
pub async fn list_entries(
    State(state): State<AppState>,
    Path(room): Path<String>,
) -> Result<Json<ApiResponse<Vec<EntryResponse>>>, ApiError> {
    let entries = state.entry_service.list_entries(&room).await?;
    Ok(Json(ApiResponse::ok(entry_list(&entries))))
}

/// POST /api/rooms/{room}/folders
pub async fn create_folder(
    State(state): State<AppState>,
    Path(room): Path<String>,
    Json(req): Json<CreateFolderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EntryResponse>>), ApiError> {
    let folder = state
        .entry_service
        .create_folder(&room, &req.name, req.parent_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(EntryResponse::from(&folder))),
    ))
}

/// PATCH /api/rooms/{room}/entries/{id}
pub async fn rename_entry(
    State(state): State<AppState>,
    Path((room, id)): Path<(String, String)>,
    Json(req): Json<RenameEntryRequest>,
) -> Result<Json<ApiResponse<RenameResponse>>, ApiError> {
    let id = parse_entry_id(&id)?;
    let outcome = state.entry_service.rename(&room, id, &req.name).await?;
    Ok(Json(ApiResponse::ok(RenameResponse::from(outcome))))
}

/// DELETE /api/rooms/{room}/entries/{id}
pub async fn delete_entry(
    State(state): State<AppState>,
    Path((room, id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<DeleteResponse>>, ApiError> {
    let id = parse_entry_id(&id)?;
    let outcome = state.entry_service.delete(&room, id).await?;
    Ok(Json(ApiResponse::ok(DeleteResponse::from(outcome))))
}
