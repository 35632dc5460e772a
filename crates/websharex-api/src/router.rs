//! Route definitions for the WebShareX HTTP API.
//!
//! All routes are organized by resource and mounted under `/api`. The
//! returned router still needs its `AppState`; see [`crate::app::build_app`].

use axum::Router;
use axum::routing::{get, patch, post, put};

use crate::handlers;
use crate::state::AppState;

/// Build the route tree.
pub fn build_router() -> Router<AppState> {
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(room_routes())
        .merge(entry_routes())
        .merge(share_routes())
        .merge(sync_routes());

    Router::new().nest("/api", api_routes)
}

/// Health endpoints: liveness and backend readiness
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}

/// Room endpoints: create, list, get, delete, verify, cursor
fn room_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/rooms",
            get(handlers::room::list_rooms).post(handlers::room::create_room),
        )
        .route(
            "/rooms/{room}",
            get(handlers::room::get_room).delete(handlers::room::delete_room),
        )
        .route("/rooms/{room}/verify", post(handlers::room::verify_password))
        .route("/rooms/{room}/cursor", put(handlers::room::set_cursor))
}

/// Entry endpoints: list, folders, uploads, rename, delete, download
fn entry_routes() -> Router<AppState> {
    Router::new()
        .route("/rooms/{room}/entries", get(handlers::entry::list_entries))
        .route("/rooms/{room}/folders", post(handlers::entry::create_folder))
        .route("/rooms/{room}/files", post(handlers::file::upload_files))
        .route(
            "/rooms/{room}/entries/{id}",
            patch(handlers::entry::rename_entry).delete(handlers::entry::delete_entry),
        )
        .route(
            "/rooms/{room}/entries/{id}/download",
            get(handlers::file::download_url),
        )
}

/// Share endpoints: per-file options and public access
fn share_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/rooms/{room}/entries/{id}/share",
            put(handlers::share::set_share_options),
        )
        .route("/share/{room}/{token}", get(handlers::share::access_share))
}

/// Reconciliation endpoints: one room or every room
fn sync_routes() -> Router<AppState> {
    Router::new()
        .route("/rooms/{room}/sync", post(handlers::sync::reconcile_room))
        .route("/sync", post(handlers::sync::reconcile_all))
}
