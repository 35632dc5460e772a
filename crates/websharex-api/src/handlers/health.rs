//! Health check handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// GET /api/health/detailed
pub async fn health_detailed(
    State(state): State<AppState>,
) -> Json<ApiResponse<DetailedHealthResponse>> {
    let database_ok = state.ctx.store.health_check().await.unwrap_or(false);
    let storage_ok = state.ctx.storage.health_check().await.unwrap_or(false);

    Json(ApiResponse::ok(DetailedHealthResponse {
        status: if database_ok && storage_ok { "ok" } else { "degraded" }.to_string(),
        database: state_label(database_ok, "connected"),
        storage: state_label(storage_ok, "available"),
        storage_provider: state.ctx.storage.provider_type().to_string(),
    }))
}

fn state_label(ok: bool, healthy: &str) -> String {
    let label = if ok { healthy } else { "unavailable" };
    label.to_string()
}
