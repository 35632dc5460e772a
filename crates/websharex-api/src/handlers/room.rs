//! Room lifecycle handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::dto::request::{CreateRoomRequest, SetCursorRequest, VerifyPasswordRequest, validate_request};
use crate::dto::response::{
    ApiResponse, DeleteRoomResponse, RoomResponse, RoomSummary, VerifyPasswordResponse,
};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/rooms
pub async fn create_room(
    State(state): State<AppState>,
    Json(req): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RoomResponse>>), ApiError> {
    validate_request(&req)?;
    let room = state.room_service.create_room(&req.name, &req.password).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(RoomResponse::from(&room))),
    ))
}

/// GET /api/rooms
pub async fn list_rooms(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RoomSummary>>>, ApiError> {
    let rooms = state.room_service.list_rooms().await?;
    Ok(Json(ApiResponse::ok(
        rooms.iter().map(RoomSummary::from).collect(),
    )))
}

/// GET /api/rooms/{room}
pub async fn get_room(
    State(state): State<AppState>,
    Path(room): Path<String>,
) -> Result<Json<ApiResponse<RoomResponse>>, ApiError> {
    let room = state.room_service.get_room(&room).await?;
    Ok(Json(ApiResponse::ok(RoomResponse::from(&room))))
}

/// DELETE /api/rooms/{room}
pub async fn delete_room(
    State(state): State<AppState>,
    Path(room): Path<String>,
) -> Result<Json<ApiResponse<DeleteRoomResponse>>, ApiError> {
    let objects_deleted = state.room_service.delete_room(&room).await?;
    Ok(Json(ApiResponse::ok(DeleteRoomResponse { objects_deleted })))
}

/// POST /api/rooms/{room}/verify
pub async fn verify_password(
    State(state): State<AppState>,
    Path(room): Path<String>,
    Json(req): Json<VerifyPasswordRequest>,
) -> Result<Json<ApiResponse<VerifyPasswordResponse>>, ApiError> {
    validate_request(&req)?;
    let valid = state.room_service.verify_password(&room, &req.password).await?;
    Ok(Json(ApiResponse::ok(VerifyPasswordResponse { valid })))
}

/// PUT /api/rooms/{room}/cursor
pub async fn set_cursor(
    State(state): State<AppState>,
    Path(room): Path<String>,
    Json(req): Json<SetCursorRequest>,
) -> Result<Json<ApiResponse<RoomResponse>>, ApiError> {
    let room = state
        .entry_service
        .set_current_folder(&room, req.folder_id)
        .await?;
    Ok(Json(ApiResponse::ok(RoomResponse::from(&room))))
}
