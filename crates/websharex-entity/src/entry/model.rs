//! Entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use websharex_core::types::EntryId;

/// A file or folder node in a room's hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique entry identifier, stable for the entry's lifetime.
    pub id: EntryId,
    /// Display name.
    pub name: String,
    /// Containing folder (None for root entries).
    pub parent_id: Option<EntryId>,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// When the entry was last updated.
    pub updated_at: DateTime<Utc>,
    /// Folder marker or file payload.
    #[serde(flatten)]
    pub kind: EntryKind,
}

/// The two kinds of entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntryKind {
    /// A folder. Holds no data of its own.
    Folder,
    /// A file backed by an object in the store.
    File(FileMeta),
}

/// File-only fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMeta {
    /// Size in bytes.
    pub size: u64,
    /// MIME type.
    pub mime_type: String,
    /// Object key in the store. None until the object has been written.
    pub storage_key: Option<String>,
    /// Public sharing state.
    #[serde(default)]
    pub share: ShareSettings,
}

/// Public share link state of a file. Independent of tree structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareSettings {
    /// When the link stops working.
    pub expires_at: Option<DateTime<Utc>>,
    /// Argon2 hash of the link password.
    pub password_hash: Option<String>,
    /// Link token.
    pub token: Option<String>,
    /// When the token was first issued.
    pub issued_at: Option<DateTime<Utc>>,
}

impl ShareSettings {
    /// Whether a share link is currently issued.
    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    /// Whether the link has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

impl Entry {
    /// Create a new folder entry stamped with the current time.
    pub fn folder(name: impl Into<String>, parent_id: Option<EntryId>) -> Self {
        let now = Utc::now();
        Self {
            id: EntryId::new(),
            name: name.into(),
            parent_id,
            created_at: now,
            updated_at: now,
            kind: EntryKind::Folder,
        }
    }

    /// Create a new file entry stamped with the current time.
    pub fn file(name: impl Into<String>, parent_id: Option<EntryId>, meta: FileMeta) -> Self {
        let now = Utc::now();
        Self {
            id: EntryId::new(),
            name: name.into(),
            parent_id,
            created_at: now,
            updated_at: now,
            kind: EntryKind::File(meta),
        }
    }

    /// Check if this entry is a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self.kind, EntryKind::Folder)
    }

    /// Check if this entry is a file.
    pub fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File(_))
    }

    /// File fields, if this is a file.
    pub fn file_meta(&self) -> Option<&FileMeta> {
        match &self.kind {
            EntryKind::File(meta) => Some(meta),
            EntryKind::Folder => None,
        }
    }

    /// Mutable file fields, if this is a file.
    pub fn file_meta_mut(&mut self) -> Option<&mut FileMeta> {
        match &mut self.kind {
            EntryKind::File(meta) => Some(meta),
            EntryKind::Folder => None,
        }
    }

    /// The object key of a persisted file.
    pub fn storage_key(&self) -> Option<&str> {
        self.file_meta().and_then(|m| m.storage_key.as_deref())
    }

    /// Bump `updated_at` to now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
