//! # websharex-api
//!
//! HTTP API layer for WebShareX built on Axum.
//!
//! Provides the room, entry, share, and sync endpoints, middleware
//! (request logging, CORS, body limits, timeouts), DTOs, and the mapping
//! from [`websharex_core::AppError`] to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
