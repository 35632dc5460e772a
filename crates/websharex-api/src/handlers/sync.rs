//! On-demand reconciliation handlers.

use axum::Json;
use axum::extract::{Path, State};

use websharex_service::ReconcileReport;
use websharex_service::sync::RoomReconcile;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/rooms/{room}/sync
pub async fn reconcile_room(
    State(state): State<AppState>,
    Path(room): Path<String>,
) -> Result<Json<ApiResponse<ReconcileReport>>, ApiError> {
    let report = state.reconcile_service.reconcile(&room).await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// POST /api/sync
pub async fn reconcile_all(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RoomReconcile>>>, ApiError> {
    let results = state.reconcile_service.reconcile_all().await?;
    Ok(Json(ApiResponse::ok(results)))
}
