//! Drift repair between an entry tree and an object listing.
//!
//! Three stages run over one snapshot of the listing:
//!
//! 1. Prune: drop files whose object is gone and folders with no content,
//!    then everything left under a dropped parent, until nothing changes.
//! 2. Repair: re-parent surviving files whose parent is gone, using the
//!    folder names in their key.
//! 3. Synthesize: create entries for listed objects no file claims,
//!    creating each missing folder once.
//!
//! Running a pass twice against the same listing changes nothing the
//! second time.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use websharex_core::result::AppResult;
use websharex_core::traits::storage::ObjectMeta;
use websharex_core::types::EntryId;
use websharex_entity::entry::{Entry, EntryTree, FileMeta, ShareSettings};

use crate::entry::guess_mime;
use crate::keys;
use crate::tree::{PathResolver, descendants_of_all};

/// Room objects keyed by their room-relative key.
pub type Listing = BTreeMap<String, ObjectMeta>;

/// Counts of what a pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Entries dropped by the prune stage.
    pub removed: usize,
    /// Folders and files created by the synthesis stage.
    pub added: usize,
    /// Files given a new parent by the repair stage.
    pub reparented: usize,
}

impl ReconcileReport {
    /// Whether the pass changed anything.
    pub fn changed(&self) -> bool {
        self.removed + self.added + self.reparented > 0
    }
}

/// Reconcile `tree` against `listing` in place.
///
/// `keep_marked_folders` decides whether a marker object (including a
/// directory placeholder key ending in `/`) counts as folder content; when
/// it does, marker-only prefixes also synthesize folders.
/// A cyclic parent chain aborts the pass; `tree` may then be partially
/// pruned and must be discarded by the caller.
pub fn reconcile_entries(
    room: &str,
    tree: &mut EntryTree,
    listing: &Listing,
    keep_marked_folders: bool,
) -> AppResult<ReconcileReport> {
    let live_keys: HashSet<String> = listing
        .keys()
        .map(|rel| format!("{}{rel}", keys::room_prefix(room)))
        .collect();

    let removed = prune(tree, listing, &live_keys, keep_marked_folders)?;
    let reparented = repair(room, tree)?;
    let added = synthesize(room, tree, listing, keep_marked_folders)?;

    let report = ReconcileReport {
        removed,
        added,
        reparented,
    };
    debug!(room, ?report, "Reconciled entry tree");
    Ok(report)
}

fn has_content(listing: &Listing, prefix: &str, keep_marked_folders: bool) -> bool {
    listing
        .range(prefix.to_string()..)
        .take_while(|(rel, _)| rel.starts_with(prefix))
        .any(|(rel, _)| keep_marked_folders || !keys::is_marker(rel))
}

fn prune(
    tree: &mut EntryTree,
    listing: &Listing,
    live_keys: &HashSet<String>,
    keep_marked_folders: bool,
) -> AppResult<usize> {
    let mut removed = 0;
    loop {
        let mut doomed: HashSet<EntryId> = HashSet::new();
        {
            let mut resolver = PathResolver::new(tree.entries());
            for entry in tree.entries() {
                if let Some(key) = entry.storage_key() {
                    if !live_keys.contains(key) {
                        doomed.insert(entry.id);
                    }
                } else if entry.is_folder() {
                    let path = resolver.container_path(Some(entry.id))?;
                    if path.orphaned {
                        continue;
                    }
                    let prefix = format!("{}/", path.joined());
                    if !has_content(listing, &prefix, keep_marked_folders) {
                        doomed.insert(entry.id);
                    }
                }
            }
        }

        let surviving_folders: HashSet<EntryId> = tree
            .entries()
            .iter()
            .filter(|e| e.is_folder() && !doomed.contains(&e.id))
            .map(|e| e.id)
            .collect();
        let orphans: Vec<EntryId> = tree
            .entries()
            .iter()
            .filter(|e| !doomed.contains(&e.id))
            .filter(|e| e.parent_id.is_some_and(|p| !surviving_folders.contains(&p)))
            .map(|e| e.id)
            .collect();

        let cascade = descendants_of_all(tree.entries(), doomed.iter().copied().chain(orphans));
        let mut batch: HashSet<EntryId> = tree
            .entries()
            .iter()
            .filter(|e| cascade.contains(&e.id))
            .filter(|e| doomed.contains(&e.id) || !e.storage_key().is_some_and(|k| live_keys.contains(k)))
            .map(|e| e.id)
            .collect();
        batch.extend(doomed);

        let count = tree.remove_all(&batch);
        if count == 0 {
            return Ok(removed);
        }
        removed += count;
    }
}

/// Index of surviving folder paths to folder ids. The first folder with a
/// given path wins.
fn folder_index(tree: &EntryTree) -> AppResult<HashMap<String, EntryId>> {
    let mut resolver = PathResolver::new(tree.entries());
    let mut index = HashMap::new();
    for entry in tree.entries().iter().filter(|e| e.is_folder()) {
        let path = resolver.container_path(Some(entry.id))?;
        if !path.orphaned {
            index.entry(path.joined()).or_insert(entry.id);
        }
    }
    Ok(index)
}

fn repair(room: &str, tree: &mut EntryTree) -> AppResult<usize> {
    let misplaced: Vec<(EntryId, String)> = tree
        .entries()
        .iter()
        .filter(|e| e.is_file())
        .filter(|e| e.parent_id.is_some_and(|p| !tree.is_folder(p)))
        .map(|e| (e.id, e.storage_key().unwrap_or_default().to_string()))
        .collect();
    if misplaced.is_empty() {
        return Ok(0);
    }

    let index = folder_index(tree)?;
    for (id, key) in &misplaced {
        let dirs: Vec<&str> = keys::relative_key(room, key)
            .map(|rel| {
                let mut parts: Vec<&str> = rel.split('/').filter(|s| !s.is_empty()).collect();
                parts.pop();
                parts
            })
            .unwrap_or_default();
        let parent = (1..=dirs.len())
            .rev()
            .find_map(|depth| index.get(&dirs[..depth].join("/")).copied());

        if let Some(entry) = tree.get_mut(*id) {
            entry.parent_id = parent;
            entry.touch();
        }
    }
    Ok(misplaced.len())
}

fn synthesize(
    room: &str,
    tree: &mut EntryTree,
    listing: &Listing,
    keep_marked_folders: bool,
) -> AppResult<usize> {
    let mut index = folder_index(tree)?;
    let mut claimed: HashSet<String> = tree
        .entries()
        .iter()
        .filter_map(|e| e.storage_key())
        .map(str::to_string)
        .collect();
    let mut added = 0;

    for (rel, meta) in listing {
        let marker = keys::is_marker(rel);
        if marker && !keep_marked_folders {
            continue;
        }
        let key = format!("{}{rel}", keys::room_prefix(room));
        if !marker && claimed.contains(&key) {
            continue;
        }

        let mut segments: Vec<&str> = rel.split('/').filter(|s| !s.is_empty()).collect();
        let Some(name) = segments.pop() else {
            continue;
        };
        if rel.ends_with('/') {
            // Directory placeholder: the whole key is a folder path.
            segments.push(name);
        }

        let mut parent = None;
        for depth in 1..=segments.len() {
            let path = segments[..depth].join("/");
            let id = match index.get(&path) {
                Some(id) => *id,
                None => {
                    let folder = Entry::folder(segments[depth - 1], parent);
                    let id = folder.id;
                    tree.push(folder);
                    index.insert(path, id);
                    added += 1;
                    id
                }
            };
            parent = Some(id);
        }

        if marker {
            continue;
        }
        let mut file = Entry::file(
            name,
            parent,
            FileMeta {
                size: meta.size_bytes,
                mime_type: guess_mime(name),
                storage_key: Some(key.clone()),
                share: ShareSettings::default(),
            },
        );
        file.updated_at = meta.last_modified.unwrap_or_else(Utc::now);
        tree.push(file);
        claimed.insert(key);
        added += 1;
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use websharex_core::error::ErrorKind;

    fn listing(keys: &[&str]) -> Listing {
        keys.iter()
            .map(|k| {
                (
                    k.to_string(),
                    ObjectMeta {
                        key: format!("demo/{k}"),
                        size_bytes: 3,
                        last_modified: None,
                    },
                )
            })
            .collect()
    }

    fn file(name: &str, parent: Option<EntryId>, key: Option<&str>) -> Entry {
        Entry::file(
            name,
            parent,
            FileMeta {
                size: 3,
                mime_type: "text/plain".to_string(),
                storage_key: key.map(str::to_string),
                share: ShareSettings::default(),
            },
        )
    }

    fn find<'a>(tree: &'a EntryTree, name: &str) -> &'a Entry {
        tree.entries().iter().find(|e| e.name == name).unwrap()
    }

    #[test]
    fn test_synthesizes_shared_folders_once() {
        let mut tree = EntryTree::default();
        let objects = listing(&["a/b/c.txt", "a/d.txt"]);

        let report = reconcile_entries("demo", &mut tree, &objects, false).unwrap();
        assert_eq!(report, ReconcileReport { removed: 0, added: 4, reparented: 0 });

        let folders: Vec<&Entry> = tree.entries().iter().filter(|e| e.is_folder()).collect();
        let files: Vec<&Entry> = tree.entries().iter().filter(|e| e.is_file()).collect();
        assert_eq!(folders.len(), 2);
        assert_eq!(files.len(), 2);

        let a = find(&tree, "a");
        let b = find(&tree, "b");
        assert_eq!(a.parent_id, None);
        assert_eq!(b.parent_id, Some(a.id));
        assert_eq!(find(&tree, "c.txt").parent_id, Some(b.id));
        assert_eq!(find(&tree, "c.txt").storage_key(), Some("demo/a/b/c.txt"));
        assert_eq!(find(&tree, "d.txt").parent_id, Some(a.id));
        assert!(tree.violations().is_empty());
    }

    #[test]
    fn test_missing_object_prunes_file() {
        let f1 = file("f1.txt", None, Some("demo/f1.txt"));
        let mut tree = EntryTree::new(vec![f1]);

        let report = reconcile_entries("demo", &mut tree, &Listing::new(), false).unwrap();
        assert_eq!(report.removed, 1);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_second_pass_is_a_no_op() {
        let docs = Entry::folder("docs", None);
        let empty = Entry::folder("empty", None);
        let kept = file("kept.txt", Some(docs.id), Some("demo/docs/kept.txt"));
        let gone = file("gone.txt", Some(docs.id), Some("demo/docs/gone.txt"));
        let mut tree = EntryTree::new(vec![docs, empty, kept, gone]);
        let objects = listing(&["docs/kept.txt", "new/x.txt", "empty/.keepfolder"]);

        let first = reconcile_entries("demo", &mut tree, &objects, false).unwrap();
        assert!(first.changed());
        let snapshot = tree.clone();

        let second = reconcile_entries("demo", &mut tree, &objects, false).unwrap();
        assert_eq!(second, ReconcileReport::default());
        assert_eq!(tree, snapshot);
    }

    #[test]
    fn test_marker_policy() {
        let empty = Entry::folder("empty", None);
        let objects = listing(&["empty/.keepfolder", "fresh/.keepfolder"]);

        let mut pruned = EntryTree::new(vec![empty.clone()]);
        let report = reconcile_entries("demo", &mut pruned, &objects, false).unwrap();
        assert_eq!(report, ReconcileReport { removed: 1, added: 0, reparented: 0 });
        assert!(pruned.is_empty());

        let mut kept = EntryTree::new(vec![empty.clone()]);
        let report = reconcile_entries("demo", &mut kept, &objects, true).unwrap();
        assert_eq!(report, ReconcileReport { removed: 0, added: 1, reparented: 0 });
        assert!(kept.contains(empty.id));
        assert!(kept.entries().iter().any(|e| e.name == "fresh" && e.is_folder()));

        let again = reconcile_entries("demo", &mut kept, &objects, true).unwrap();
        assert!(!again.changed());
    }

    #[test]
    fn test_directory_placeholders_follow_marker_policy() {
        let empty = Entry::folder("empty", None);
        let objects = listing(&["empty/", "ghost/"]);

        let mut pruned = EntryTree::new(vec![empty.clone()]);
        let report = reconcile_entries("demo", &mut pruned, &objects, false).unwrap();
        assert_eq!(report, ReconcileReport { removed: 1, added: 0, reparented: 0 });
        assert!(pruned.is_empty());

        let mut kept = EntryTree::new(vec![empty.clone()]);
        let report = reconcile_entries("demo", &mut kept, &objects, true).unwrap();
        assert_eq!(report, ReconcileReport { removed: 0, added: 1, reparented: 0 });
        assert!(kept.contains(empty.id));
        let ghost = find(&kept, "ghost");
        assert!(ghost.is_folder());
        assert_eq!(ghost.parent_id, None);
        assert!(!kept.entries().iter().any(|e| e.is_file()));

        let again = reconcile_entries("demo", &mut kept, &objects, true).unwrap();
        assert!(!again.changed());
    }

    #[test]
    fn test_orphan_cascade_keeps_and_repairs_live_files() {
        let docs = Entry::folder("docs", None);
        let ghost_parent = EntryId::new();
        let stray = Entry::folder("stray", Some(ghost_parent));
        let inner = file("inner.txt", Some(stray.id), None);
        let live = file("live.txt", Some(stray.id), Some("demo/docs/live.txt"));
        let mut tree = EntryTree::new(vec![docs.clone(), stray, inner, live.clone()]);
        let objects = listing(&["docs/live.txt"]);

        let report = reconcile_entries("demo", &mut tree, &objects, false).unwrap();
        assert_eq!(report.removed, 2);
        assert_eq!(report.reparented, 1);
        assert_eq!(report.added, 0);
        assert_eq!(tree.get(live.id).unwrap().parent_id, Some(docs.id));
        assert!(tree.violations().is_empty());
    }

    #[test]
    fn test_keyless_files_survive_listing_check() {
        let pending = file("pending.txt", None, None);
        let mut tree = EntryTree::new(vec![pending.clone()]);
        let report = reconcile_entries("demo", &mut tree, &Listing::new(), false).unwrap();
        assert!(!report.changed());
        assert!(tree.contains(pending.id));
    }

    #[test]
    fn test_cycle_aborts_pass() {
        let mut a = Entry::folder("a", None);
        let b = Entry::folder("b", Some(a.id));
        a.parent_id = Some(b.id);
        let mut tree = EntryTree::new(vec![a, b]);
        let err = reconcile_entries("demo", &mut tree, &listing(&["a/x.txt"]), false).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CyclicHierarchy);
    }
}
