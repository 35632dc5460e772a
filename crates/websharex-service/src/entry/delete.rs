//! Cascading delete.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use websharex_core::error::AppError;
use websharex_core::result::AppResult;
use websharex_core::traits::storage::StorageProvider;
use websharex_core::types::EntryId;
use websharex_entity::entry::EntryTree;
use websharex_entity::room::Room;

use crate::context::ServiceSettings;
use crate::keys;
use crate::plan::{self, ActionReport, StorageAction};
use crate::tree::{PathResolver, descendants_of};

/// Entries to drop and the storage calls that go with them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePlan {
    /// The target and all of its descendants.
    pub removed: HashSet<EntryId>,
    /// Object-store calls, in a deterministic order.
    pub actions: Vec<StorageAction>,
}

/// Result of a delete.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteOutcome {
    /// Ids removed from the room.
    pub removed: Vec<EntryId>,
    /// Whether the room's cursor was reset.
    pub cursor_reset: bool,
    /// Per-action storage results.
    pub report: ActionReport,
}

/// Decide what deleting `id` removes and which objects go with it.
///
/// Folders are deleted by prefix; a file under an already planned prefix
/// needs no call of its own. Deleting the last file of a folder writes a
/// marker so the emptied folder stays addressable.
pub fn plan_delete(room: &str, tree: &EntryTree, id: EntryId) -> AppResult<DeletePlan> {
    let target = tree
        .get(id)
        .ok_or_else(|| AppError::not_found(format!("Entry {id} not found in room '{room}'")))?;

    let removed = descendants_of(tree.entries(), id);
    let mut resolver = PathResolver::new(tree.entries());

    let mut prefixes = Vec::new();
    for entry in tree.entries().iter().filter(|e| removed.contains(&e.id) && e.is_folder()) {
        let path = resolver.container_path(Some(entry.id))?;
        if !path.orphaned {
            prefixes.push(keys::folder_prefix(room, &path.segments));
        }
    }
    prefixes.sort();
    let mut covering: Vec<String> = Vec::new();
    for prefix in prefixes {
        if !covering.iter().any(|outer| prefix.starts_with(outer.as_str())) {
            covering.push(prefix);
        }
    }

    let mut file_keys: Vec<String> = tree
        .entries()
        .iter()
        .filter(|e| removed.contains(&e.id))
        .filter_map(|e| e.storage_key())
        .filter(|key| !covering.iter().any(|prefix| key.starts_with(prefix.as_str())))
        .map(str::to_string)
        .collect();
    file_keys.sort();
    file_keys.dedup();

    let mut actions: Vec<StorageAction> = covering
        .into_iter()
        .map(|prefix| StorageAction::DeletePrefix { prefix })
        .collect();
    actions.extend(file_keys.into_iter().map(|key| StorageAction::Delete { key }));

    if target.is_file() {
        if let Some(parent) = target.parent_id.filter(|p| tree.is_folder(*p)) {
            let siblings_left = tree
                .children(Some(parent))
                .any(|e| e.is_file() && !removed.contains(&e.id));
            if !siblings_left {
                let path = resolver.container_path(Some(parent))?;
                if !path.orphaned {
                    actions.push(StorageAction::PutMarker {
                        key: keys::marker_key(room, &path.segments),
                    });
                }
            }
        }
    }

    Ok(DeletePlan { removed, actions })
}

/// Delete an entry and its subtree from storage and from `room`.
///
/// Storage calls are best-effort; the metadata change is applied once
/// they have all settled, whatever their outcome. The caller persists.
pub async fn delete_entry(
    storage: &Arc<dyn StorageProvider>,
    settings: &ServiceSettings,
    room: &mut Room,
    id: EntryId,
) -> AppResult<DeleteOutcome> {
    let mut tree = room.tree();
    let plan = plan_delete(&room.name, &tree, id)?;

    let report = plan::execute(
        storage,
        plan.actions,
        settings.concurrency,
        settings.list_page_size,
    )
    .await;

    tree.remove_all(&plan.removed);
    room.entries = tree.into_entries();

    let cursor_reset = room
        .current_folder_id
        .is_some_and(|current| plan.removed.contains(&current));
    if cursor_reset {
        room.current_folder_id = None;
    }

    info!(
        room = %room.name,
        entry_id = %id,
        removed = plan.removed.len(),
        storage_failures = report.failed.len(),
        "Deleted entry"
    );

    let mut removed: Vec<EntryId> = plan.removed.into_iter().collect();
    removed.sort();
    Ok(DeleteOutcome {
        removed,
        cursor_reset,
        report,
    })
}
