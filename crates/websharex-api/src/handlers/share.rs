//! Share link handlers.

use axum::Json;
use axum::extract::{Path, Query, State};

use websharex_service::SharedFile;

use crate::dto::request::{ShareAccessQuery, ShareOptionsRequest};
use crate::dto::response::{ApiResponse, EntryResponse};
use crate::error::ApiError;
use crate::extractors::parse_entry_id;
use crate::state::AppState;

/// PUT /api/rooms/{room}/entries/{id}/share
pub async fn set_share_options(
    State(state): State<AppState>,
    Path((room, id)): Path<(String, String)>,
    Json(req): Json<ShareOptionsRequest>,
) -> Result<Json<ApiResponse<EntryResponse>>, ApiError> {
    let id = parse_entry_id(&id)?;
    let entry = state
        .share_service
        .set_share_options(&room, id, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(EntryResponse::from(&entry))))
}

/// GET /api/share/{room}/{token}?password=...
pub async fn access_share(
    State(state): State<AppState>,
    Path((room, token)): Path<(String, String)>,
    Query(query): Query<ShareAccessQuery>,
) -> Result<Json<ApiResponse<SharedFile>>, ApiError> {
    let file = state
        .share_service
        .access_share(&room, &token, query.password.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(file)))
}
