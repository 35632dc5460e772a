//! In-memory entry forest for one room.
//!
//! The tree is loaded once per operation, mutated in place, and written
//! back as a whole. It does not enforce its invariants on every mutation;
//! [`EntryTree::violations`] reports what is currently broken.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use websharex_core::types::EntryId;

use super::model::Entry;

/// A broken structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum TreeViolation {
    /// `parent_id` names an entry that does not exist.
    DanglingParent { entry: EntryId, parent: EntryId },
    /// `parent_id` names a file.
    ParentNotFolder { entry: EntryId, parent: EntryId },
    /// The entry is its own ancestor.
    Cycle { entry: EntryId },
    /// Two files share one storage key.
    DuplicateStorageKey { key: String, entries: Vec<EntryId> },
    /// Two siblings share one name.
    DuplicateSiblingName { parent: Option<EntryId>, name: String },
}

/// A room's entries as a forest keyed by parent references.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryTree {
    entries: Vec<Entry>,
}

impl EntryTree {
    /// Wrap a room's entry list.
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Unwrap into the entry list for persistence.
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the room has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry.
    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Look up an entry for mutation.
    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// Whether `id` names a live entry.
    pub fn contains(&self, id: EntryId) -> bool {
        self.get(id).is_some()
    }

    /// Whether `id` names a live folder.
    pub fn is_folder(&self, id: EntryId) -> bool {
        self.get(id).is_some_and(Entry::is_folder)
    }

    /// Direct children of `parent` (`None` for root entries).
    pub fn children(&self, parent: Option<EntryId>) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(move |e| e.parent_id == parent)
    }

    /// A sibling under `parent` with the given name, ignoring `except`.
    pub fn sibling_named(
        &self,
        parent: Option<EntryId>,
        name: &str,
        except: Option<EntryId>,
    ) -> Option<&Entry> {
        self.children(parent)
            .find(|e| e.name == name && Some(e.id) != except)
    }

    /// The file entry that owns a storage key.
    pub fn find_by_storage_key(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.storage_key() == Some(key))
    }

    /// Append an entry.
    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Remove every entry whose id is in `ids`. Returns how many were removed.
    pub fn remove_all(&mut self, ids: &HashSet<EntryId>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !ids.contains(&e.id));
        before - self.entries.len()
    }

    /// Report every broken structural invariant.
    pub fn violations(&self) -> Vec<TreeViolation> {
        let by_id: HashMap<EntryId, &Entry> = self.entries.iter().map(|e| (e.id, e)).collect();
        let mut found = Vec::new();

        for entry in &self.entries {
            let Some(parent_id) = entry.parent_id else {
                continue;
            };
            match by_id.get(&parent_id) {
                None => found.push(TreeViolation::DanglingParent {
                    entry: entry.id,
                    parent: parent_id,
                }),
                Some(parent) if !parent.is_folder() => found.push(TreeViolation::ParentNotFolder {
                    entry: entry.id,
                    parent: parent_id,
                }),
                Some(_) => {}
            }

            let mut cursor = entry.parent_id;
            let mut steps = 0;
            while let Some(current) = cursor {
                if current == entry.id {
                    found.push(TreeViolation::Cycle { entry: entry.id });
                    break;
                }
                steps += 1;
                if steps > self.entries.len() {
                    // Cycle further up; reported from one of its members.
                    break;
                }
                cursor = by_id.get(&current).and_then(|e| e.parent_id);
            }
        }

        let mut keys: HashMap<&str, Vec<EntryId>> = HashMap::new();
        for entry in &self.entries {
            if let Some(key) = entry.storage_key() {
                keys.entry(key).or_default().push(entry.id);
            }
        }
        let mut duplicate_keys: Vec<_> = keys.into_iter().filter(|(_, ids)| ids.len() > 1).collect();
        duplicate_keys.sort_by(|a, b| a.0.cmp(b.0));
        for (key, entries) in duplicate_keys {
            found.push(TreeViolation::DuplicateStorageKey {
                key: key.to_string(),
                entries,
            });
        }

        let mut seen: HashSet<(Option<EntryId>, &str)> = HashSet::new();
        let mut reported: HashSet<(Option<EntryId>, &str)> = HashSet::new();
        for entry in &self.entries {
            let slot = (entry.parent_id, entry.name.as_str());
            if !seen.insert(slot) && reported.insert(slot) {
                found.push(TreeViolation::DuplicateSiblingName {
                    parent: entry.parent_id,
                    name: entry.name.clone(),
                });
            }
        }

        found
    }
}

impl From<Vec<Entry>> for EntryTree {
    fn from(entries: Vec<Entry>) -> Self {
        Self::new(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::model::{FileMeta, ShareSettings};

    fn file(name: &str, parent: Option<EntryId>, key: &str) -> Entry {
        Entry::file(
            name,
            parent,
            FileMeta {
                size: 1,
                mime_type: "text/plain".to_string(),
                storage_key: Some(key.to_string()),
                share: ShareSettings::default(),
            },
        )
    }

    #[test]
    fn test_well_formed_tree_has_no_violations() {
        let docs = Entry::folder("docs", None);
        let tree = EntryTree::new(vec![
            file("a.txt", Some(docs.id), "demo/docs/a.txt"),
            docs,
        ]);
        assert!(tree.violations().is_empty());
    }

    #[test]
    fn test_detects_dangling_and_non_folder_parents() {
        let ghost = EntryId::new();
        let holder = file("holder.txt", None, "demo/holder.txt");
        let child = file("child.txt", Some(holder.id), "demo/child.txt");
        let orphan = Entry::folder("orphan", Some(ghost));
        let tree = EntryTree::new(vec![holder.clone(), child.clone(), orphan.clone()]);

        let violations = tree.violations();
        assert!(violations.contains(&TreeViolation::ParentNotFolder {
            entry: child.id,
            parent: holder.id,
        }));
        assert!(violations.contains(&TreeViolation::DanglingParent {
            entry: orphan.id,
            parent: ghost,
        }));
    }

    #[test]
    fn test_detects_cycle() {
        let mut a = Entry::folder("a", None);
        let b = Entry::folder("b", Some(a.id));
        a.parent_id = Some(b.id);
        let tree = EntryTree::new(vec![a.clone(), b.clone()]);

        let violations = tree.violations();
        assert!(violations.contains(&TreeViolation::Cycle { entry: a.id }));
        assert!(violations.contains(&TreeViolation::Cycle { entry: b.id }));
    }

    #[test]
    fn test_detects_duplicates() {
        let one = file("same.txt", None, "demo/same.txt");
        let two = file("same.txt", None, "demo/same.txt");
        let tree = EntryTree::new(vec![one.clone(), two.clone()]);

        let violations = tree.violations();
        assert!(violations.contains(&TreeViolation::DuplicateStorageKey {
            key: "demo/same.txt".to_string(),
            entries: vec![one.id, two.id],
        }));
        assert!(violations.contains(&TreeViolation::DuplicateSiblingName {
            parent: None,
            name: "same.txt".to_string(),
        }));
    }

    #[test]
    fn test_remove_all_and_sibling_lookup() {
        let docs = Entry::folder("docs", None);
        let a = file("a.txt", Some(docs.id), "demo/docs/a.txt");
        let mut tree = EntryTree::new(vec![docs.clone(), a.clone()]);

        assert_eq!(tree.sibling_named(Some(docs.id), "a.txt", None).map(|e| e.id), Some(a.id));
        assert!(tree.sibling_named(Some(docs.id), "a.txt", Some(a.id)).is_none());
        assert_eq!(tree.find_by_storage_key("demo/docs/a.txt").map(|e| e.id), Some(a.id));

        let removed = tree.remove_all(&HashSet::from([a.id]));
        assert_eq!(removed, 1);
        assert_eq!(tree.children(Some(docs.id)).count(), 0);
        assert!(tree.is_folder(docs.id));
    }
}
