//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use websharex_core::config::AppConfig;
use websharex_service::{
    EntryService, ReconcileService, RoomService, ServiceContext, ShareService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Room store, object store, locks, and tunables
    pub ctx: Arc<ServiceContext>,
    /// Room lifecycle service
    pub room_service: Arc<RoomService>,
    /// Entry operation service
    pub entry_service: Arc<EntryService>,
    /// Share link service
    pub share_service: Arc<ShareService>,
    /// Metadata/object-store reconciliation service
    pub reconcile_service: Arc<ReconcileService>,
}

impl AppState {
    /// Build every service over one context.
    pub fn new(config: AppConfig, ctx: Arc<ServiceContext>) -> Self {
        Self {
            config: Arc::new(config),
            room_service: Arc::new(RoomService::new(Arc::clone(&ctx))),
            entry_service: Arc::new(EntryService::new(Arc::clone(&ctx))),
            share_service: Arc::new(ShareService::new(Arc::clone(&ctx))),
            reconcile_service: Arc::new(ReconcileService::new(Arc::clone(&ctx))),
            ctx,
        }
    }
}
