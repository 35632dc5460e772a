//! Reconciliation bound to the room and object stores.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use websharex_core::result::AppResult;
use websharex_entity::room::Room;

use crate::context::ServiceContext;
use crate::keys;

use super::reconciler::{Listing, ReconcileReport, reconcile_entries};

/// Result of reconciling one room during a sweep.
#[derive(Debug, Clone, Serialize)]
pub struct RoomReconcile {
    /// Room name.
    pub room: String,
    /// Counts, when the pass succeeded.
    pub report: Option<ReconcileReport>,
    /// Failure message, when it did not.
    pub error: Option<String>,
}

/// Repairs room metadata from the object store.
#[derive(Debug, Clone)]
pub struct ReconcileService {
    ctx: Arc<ServiceContext>,
}

impl ReconcileService {
    /// Creates a new reconcile service.
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Reconcile one room against a full listing of its prefix.
    ///
    /// The room is written back only when the pass changed something. A
    /// cursor that no longer names a live folder is reset to the root.
    pub async fn reconcile(&self, room: &str) -> AppResult<ReconcileReport> {
        self.ctx
            .exclusive(room, "reconcile", async {
                let mut state = self.ctx.load_room(room).await?;
                let prefix = keys::room_prefix(room);
                let objects = self
                    .ctx
                    .storage
                    .list_all(&prefix, self.ctx.settings.list_page_size)
                    .await?;
                let listing: Listing = objects
                    .into_iter()
                    .filter_map(|meta| {
                        let rel = keys::relative_key(room, &meta.key)?.to_string();
                        Some((rel, meta))
                    })
                    .collect();

                let mut tree = state.tree();
                let report = reconcile_entries(
                    room,
                    &mut tree,
                    &listing,
                    self.ctx.settings.keep_marked_folders,
                )?;

                let cursor_lost = state
                    .current_folder_id
                    .is_some_and(|id| !tree.is_folder(id));
                if !report.changed() && !cursor_lost {
                    return Ok(report);
                }

                state.entries = tree.into_entries();
                if cursor_lost {
                    state.current_folder_id = None;
                }
                let saved: Room = self.ctx.persist(&state).await?;
                info!(
                    room = %saved.name,
                    removed = report.removed,
                    added = report.added,
                    reparented = report.reparented,
                    cursor_reset = cursor_lost,
                    "Room reconciled"
                );
                Ok(report)
            })
            .await
    }

    /// Reconcile every room. A failing room does not stop the sweep.
    pub async fn reconcile_all(&self) -> AppResult<Vec<RoomReconcile>> {
        let rooms = self.ctx.store.list_rooms().await?;
        let mut results = Vec::with_capacity(rooms.len());
        for room in rooms {
            let result = match self.reconcile(&room.name).await {
                Ok(report) => RoomReconcile {
                    room: room.name,
                    report: Some(report),
                    error: None,
                },
                Err(e) => {
                    error!(room = %room.name, error = %e, "Room reconciliation failed");
                    RoomReconcile {
                        room: room.name,
                        report: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            results.push(result);
        }
        Ok(results)
    }
}
