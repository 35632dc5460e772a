//! Rename with storage remapping.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use websharex_core::error::AppError;
use websharex_core::result::AppResult;
use websharex_core::traits::storage::StorageProvider;
use websharex_core::types::EntryId;
use websharex_entity::entry::{Entry, validate_name};
use websharex_entity::room::Room;

use crate::context::ServiceSettings;
use crate::keys;
use crate::plan::{self, ActionReport, StorageAction};
use crate::tree::{PathResolver, descendants_of};

/// Result of a rename.
#[derive(Debug, Clone, Serialize)]
pub struct RenameOutcome {
    /// The renamed entry.
    pub entry: Entry,
    /// File entries whose storage key moved with the rename.
    pub rekeyed: usize,
    /// Per-action storage results.
    pub report: ActionReport,
}

/// Rename an entry in `room`, moving its objects in the store.
///
/// A file's object is copied next to itself under the new name, then the
/// old key is deleted. A failed copy aborts with no metadata change.
///
/// Objects already present at the destination are never overwritten: the
/// rename fails with `Conflict` before anything is copied.
///
/// A folder's objects are copied from the old prefix to the new one, and
/// each old key is deleted only after its copy succeeded. Descendant file
/// keys are rewritten to the new prefix except where the copy failed, so
/// those entries still point at an object that exists.
///
/// The caller persists.
pub async fn rename_entry(
    storage: &Arc<dyn StorageProvider>,
    settings: &ServiceSettings,
    room: &mut Room,
    id: EntryId,
    new_name: &str,
) -> AppResult<RenameOutcome> {
    let name = validate_name(new_name)?;
    let tree = room.tree();
    let entry = tree
        .get(id)
        .cloned()
        .ok_or_else(|| AppError::not_found(format!("Entry {id} not found in room '{}'", room.name)))?;

    if entry.name == name {
        return Ok(RenameOutcome {
            entry,
            rekeyed: 0,
            report: ActionReport::default(),
        });
    }
    if tree.sibling_named(entry.parent_id, &name, Some(id)).is_some() {
        return Err(AppError::conflict(format!(
            "An entry named '{name}' already exists here"
        )));
    }

    let parent_path = PathResolver::new(tree.entries()).resolve(id)?;
    let mut entries = tree.into_entries();

    let (rekeyed, report) = if entry.is_file() {
        rename_file_object(storage, settings, &entry, &name, &mut entries).await?
    } else if parent_path.orphaned {
        (0, ActionReport::default())
    } else {
        let old_prefix = keys::folder_prefix(&room.name, &parent_path.child(&entry.name));
        let new_prefix = keys::folder_prefix(&room.name, &parent_path.child(&name));
        let (moves, report) =
            move_folder_objects(storage, settings, &entries, id, &old_prefix, &new_prefix).await?;
        (apply_rekeys(&mut entries, &moves), report)
    };

    let renamed = entries
        .iter_mut()
        .find(|e| e.id == id)
        .ok_or_else(|| AppError::internal(format!("Entry {id} vanished during rename")))?;
    renamed.name = name;
    renamed.touch();
    let renamed = renamed.clone();
    room.entries = entries;

    info!(
        room = %room.name,
        entry_id = %id,
        old_name = %entry.name,
        new_name = %renamed.name,
        rekeyed,
        storage_failures = report.failed.len(),
        "Renamed entry"
    );

    Ok(RenameOutcome {
        entry: renamed,
        rekeyed,
        report,
    })
}

/// Copy a file's object to its new key, then drop the old one.
async fn rename_file_object(
    storage: &Arc<dyn StorageProvider>,
    settings: &ServiceSettings,
    entry: &Entry,
    name: &str,
    entries: &mut [Entry],
) -> AppResult<(usize, ActionReport)> {
    let Some(old_key) = entry.storage_key().map(str::to_string) else {
        return Ok((0, ActionReport::default()));
    };
    let new_key = keys::sibling_key(&old_key, name);
    if entries
        .iter()
        .any(|e| e.id != entry.id && e.storage_key() == Some(new_key.as_str()))
    {
        return Err(AppError::conflict(format!(
            "Storage key '{new_key}' is already in use"
        )));
    }
    let occupied = storage
        .list_all(&new_key, settings.list_page_size)
        .await?
        .iter()
        .any(|o| o.key == new_key);
    if occupied {
        return Err(AppError::conflict(format!(
            "An object already exists at '{new_key}'"
        )));
    }

    storage.copy(&old_key, &new_key).await?;

    let mut report = ActionReport::default();
    report.succeeded.push(StorageAction::Copy {
        from: old_key.clone(),
        to: new_key.clone(),
    });
    let cleanup = StorageAction::Delete { key: old_key.clone() };
    match storage.delete(&old_key).await {
        Ok(()) => report.succeeded.push(cleanup),
        Err(e) => {
            warn!(key = %old_key, error = %e, "Failed to delete object after rename copy");
            report.failed.push(plan::FailedAction {
                action: cleanup,
                error: e.to_string(),
            });
        }
    }

    let moves = vec![(old_key, new_key)];
    Ok((apply_rekeys(entries, &moves), report))
}

/// Move every object under `old_prefix` to `new_prefix`.
///
/// Returns the `(old, new)` key pairs descendant files should adopt.
async fn move_folder_objects(
    storage: &Arc<dyn StorageProvider>,
    settings: &ServiceSettings,
    entries: &[Entry],
    folder: EntryId,
    old_prefix: &str,
    new_prefix: &str,
) -> AppResult<(Vec<(String, String)>, ActionReport)> {
    let occupied = storage.list_all(new_prefix, settings.list_page_size).await?;
    if let Some(first) = occupied.first() {
        return Err(AppError::conflict(format!(
            "Objects already exist under '{new_prefix}' (first: '{}')",
            first.key
        )));
    }

    let objects = storage.list_all(old_prefix, settings.list_page_size).await?;
    let remap = |key: &str| format!("{new_prefix}{}", &key[old_prefix.len()..]);

    let copies: Vec<StorageAction> = objects
        .iter()
        .map(|o| StorageAction::Copy {
            from: o.key.clone(),
            to: remap(&o.key),
        })
        .collect();
    let mut report = plan::execute(
        storage,
        copies,
        settings.concurrency,
        settings.list_page_size,
    )
    .await;

    let cleanups: Vec<StorageAction> = report
        .succeeded
        .iter()
        .filter_map(|action| match action {
            StorageAction::Copy { from, .. } => Some(StorageAction::Delete { key: from.clone() }),
            _ => None,
        })
        .collect();
    let cleanup_report = plan::execute(
        storage,
        cleanups,
        settings.concurrency,
        settings.list_page_size,
    )
    .await;
    report.merge(cleanup_report);

    let subtree = descendants_of(entries, folder);
    let moves = entries
        .iter()
        .filter(|e| subtree.contains(&e.id))
        .filter_map(|e| e.storage_key())
        .filter(|key| key.starts_with(old_prefix) && !report.copy_failed(key))
        .map(|key| (key.to_string(), remap(key)))
        .collect();

    Ok((moves, report))
}

/// Rewrite storage keys per `moves`. Returns how many entries changed.
fn apply_rekeys(entries: &mut [Entry], moves: &[(String, String)]) -> usize {
    let mut count = 0;
    for entry in entries.iter_mut() {
        let Some(meta) = entry.file_meta_mut() else {
            continue;
        };
        let Some(current) = meta.storage_key.as_deref() else {
            continue;
        };
        if let Some((_, to)) = moves.iter().find(|(from, _)| from == current) {
            meta.storage_key = Some(to.clone());
            entry.touch();
            count += 1;
        }
    }
    count
}
