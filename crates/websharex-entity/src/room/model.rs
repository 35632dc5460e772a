//! Room entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use websharex_core::types::EntryId;

use crate::entry::{Entry, EntryTree};

/// A named shared space holding one entry tree.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Room {
    /// Unique room name. Also the first segment of every object key.
    pub name: String,
    /// Argon2 hash of the room password.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Folder the room's clients are currently browsing.
    pub current_folder_id: Option<EntryId>,
    /// Flat list of entries; hierarchy lives in `parent_id`.
    #[sqlx(json)]
    pub entries: Vec<Entry>,
    /// When the room was created.
    pub created_at: DateTime<Utc>,
    /// When the room metadata was last written.
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Create an empty room.
    pub fn new(name: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            password_hash: password_hash.into(),
            current_folder_id: None,
            entries: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Clone the entries into a tree for mutation.
    pub fn tree(&self) -> EntryTree {
        EntryTree::new(self.entries.clone())
    }

    /// Apply a patch in place.
    pub fn apply(&mut self, patch: RoomPatch) {
        if let Some(entries) = patch.entries {
            self.entries = entries;
        }
        if let Some(current) = patch.current_folder_id {
            self.current_folder_id = current;
        }
        self.updated_at = Utc::now();
    }
}

/// Partial update of a room's mutable metadata.
#[derive(Debug, Clone, Default)]
pub struct RoomPatch {
    /// Replacement entry list.
    pub entries: Option<Vec<Entry>>,
    /// Replacement cursor; `Some(None)` clears it.
    pub current_folder_id: Option<Option<EntryId>>,
}

impl RoomPatch {
    /// Patch that replaces the entry list.
    pub fn entries(entries: Vec<Entry>) -> Self {
        Self {
            entries: Some(entries),
            current_folder_id: None,
        }
    }

    /// Also set the cursor.
    pub fn with_current_folder(mut self, current: Option<EntryId>) -> Self {
        self.current_folder_id = Some(current);
        self
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_none() && self.current_folder_id.is_none()
    }
}
