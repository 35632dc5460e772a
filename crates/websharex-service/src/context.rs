//! Shared collaborators and the room operation envelope.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use websharex_core::config::AppConfig;
use websharex_core::error::AppError;
use websharex_core::result::AppResult;
use websharex_core::traits::storage::StorageProvider;
use websharex_database::RoomStore;
use websharex_entity::room::{Room, RoomPatch};

use crate::lock::RoomLocks;

/// Tunables for room operations.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Objects requested per listing page.
    pub list_page_size: usize,
    /// Storage calls in flight during a cascade.
    pub concurrency: usize,
    /// Lifetime of signed download URLs.
    pub signed_url_ttl: Duration,
    /// Deadline for one room operation, lock wait included.
    pub operation_timeout: Duration,
    /// Largest accepted upload, in bytes.
    pub max_upload_size_bytes: u64,
    /// Whether a marker object keeps its folder alive during reconciliation.
    pub keep_marked_folders: bool,
}

impl ServiceSettings {
    /// Derive settings from the application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            list_page_size: config.storage.list_page_size.max(1),
            concurrency: config.storage.concurrency.max(1),
            signed_url_ttl: Duration::from_secs(config.storage.signed_url_ttl_seconds),
            operation_timeout: Duration::from_secs(config.sync.operation_timeout_seconds.max(1)),
            max_upload_size_bytes: config.storage.max_upload_size_bytes,
            keep_marked_folders: config.sync.keep_marked_folders,
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Collaborators every room service works through.
#[derive(Debug, Clone)]
pub struct ServiceContext {
    /// Room metadata persistence.
    pub store: Arc<dyn RoomStore>,
    /// Object store.
    pub storage: Arc<dyn StorageProvider>,
    /// Per-room operation locks.
    pub locks: RoomLocks,
    /// Operation tunables.
    pub settings: ServiceSettings,
}

impl ServiceContext {
    /// Bundle the collaborators.
    pub fn new(
        store: Arc<dyn RoomStore>,
        storage: Arc<dyn StorageProvider>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            store,
            storage,
            locks: RoomLocks::new(),
            settings,
        }
    }

    /// Load a room or fail with `NotFound`.
    pub async fn load_room(&self, name: &str) -> AppResult<Room> {
        self.store
            .get_room(name)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Room '{name}' not found")))
    }

    /// Write a room's entries and cursor back in one update.
    pub async fn persist(&self, room: &Room) -> AppResult<Room> {
        self.store
            .update_room(
                &room.name,
                RoomPatch::entries(room.entries.clone()).with_current_folder(room.current_folder_id),
            )
            .await
    }

    /// Run `operation` while holding the room's lock, bounded by the
    /// operation deadline. Expiry yields `Timeout`; nothing the operation
    /// had not yet persisted is written.
    pub async fn exclusive<T, F>(&self, room: &str, operation: &'static str, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        let guarded = async {
            let _guard = self.locks.acquire(room).await;
            fut.await
        };
        match tokio::time::timeout(self.settings.operation_timeout, guarded).await {
            Ok(result) => result,
            Err(_) => {
                warn!(room, operation, timeout = ?self.settings.operation_timeout, "Room operation timed out");
                Err(AppError::timeout(format!(
                    "{operation} on room '{room}' exceeded {}s",
                    self.settings.operation_timeout.as_secs()
                )))
            }
        }
    }
}
