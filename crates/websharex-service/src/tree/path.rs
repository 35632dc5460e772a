//! Logical path resolution.
//!
//! A path is the sequence of folder names from the outermost folder down
//! to a container. Walks are bounded by the entry count so corrupted
//! parent chains fail with `CyclicHierarchy` instead of looping.

use std::collections::{HashMap, HashSet};

use websharex_core::error::AppError;
use websharex_core::result::AppResult;
use websharex_core::types::EntryId;
use websharex_entity::entry::Entry;

/// Resolved folder names, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPath {
    /// Folder names from the root down.
    pub segments: Vec<String>,
    /// The parent chain ended at a missing entry or at a file, so the
    /// segments do not describe a real location.
    pub orphaned: bool,
}

impl EntryPath {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Segments joined by `/`.
    pub fn joined(&self) -> String {
        self.segments.join("/")
    }

    /// This path extended by one folder name.
    pub fn child(&self, name: &str) -> Vec<String> {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        segments
    }
}

/// Resolves entry paths over one snapshot of a room's entries.
///
/// Folder paths are memoized, so resolving every entry of a room costs
/// O(n) lookups instead of O(n * depth).
#[derive(Debug)]
pub struct PathResolver<'a> {
    by_id: HashMap<EntryId, &'a Entry>,
    memo: HashMap<EntryId, EntryPath>,
}

impl<'a> PathResolver<'a> {
    /// Index a snapshot of entries.
    pub fn new(entries: &'a [Entry]) -> Self {
        Self {
            by_id: entries.iter().map(|e| (e.id, e)).collect(),
            memo: HashMap::new(),
        }
    }

    /// Ancestor folder names of an entry, excluding the entry itself.
    ///
    /// This is the prefix under which the entry's own object lives.
    pub fn resolve(&mut self, id: EntryId) -> AppResult<EntryPath> {
        let entry = self
            .by_id
            .get(&id)
            .ok_or_else(|| AppError::not_found(format!("Entry {id} not found")))?;
        let parent = entry.parent_id;
        self.container_path(parent)
    }

    /// Path of a folder used as a container: its ancestors plus its own
    /// name. `None` is the room root and yields an empty path.
    pub fn container_path(&mut self, folder: Option<EntryId>) -> AppResult<EntryPath> {
        let Some(start) = folder else {
            return Ok(EntryPath::root());
        };
        if let Some(path) = self.memo.get(&start) {
            return Ok(path.clone());
        }

        let mut chain: Vec<&'a Entry> = Vec::new();
        let mut visited: HashSet<EntryId> = HashSet::new();
        let mut base = EntryPath::root();
        let mut cursor = Some(start);

        while let Some(id) = cursor {
            if let Some(known) = self.memo.get(&id) {
                base = known.clone();
                break;
            }
            if !visited.insert(id) || chain.len() > self.by_id.len() {
                return Err(AppError::cyclic_hierarchy(format!(
                    "Parent chain of entry {start} revisits entry {id}"
                )));
            }
            match self.by_id.get(&id) {
                Some(entry) if entry.is_folder() => {
                    chain.push(entry);
                    cursor = entry.parent_id;
                }
                _ => {
                    base.orphaned = true;
                    break;
                }
            }
        }

        if chain.is_empty() {
            return Ok(base);
        }
        for entry in chain.iter().rev() {
            base.segments.push(entry.name.clone());
            self.memo.insert(entry.id, base.clone());
        }
        Ok(base)
    }
}
