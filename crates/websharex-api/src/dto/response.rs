//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use websharex_core::types::EntryId;
use websharex_entity::entry::{Entry, EntryKind, ShareSettings};
use websharex_entity::room::Room;
use websharex_service::{ActionReport, DeleteOutcome, RenameOutcome};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok".
    pub status: String,
    /// Server version.
    pub version: String,
}

/// Readiness response with backend checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// "ok" when every backend is reachable, else "degraded".
    pub status: String,
    /// Room store state.
    pub database: String,
    /// Object store state.
    pub storage: String,
    /// Object store backend name.
    pub storage_provider: String,
}

/// Public view of a file's share link. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareResponse {
    /// Whether a link is issued.
    pub enabled: bool,
    /// Link token.
    pub token: Option<String>,
    /// When the link stops working.
    pub expires_at: Option<DateTime<Utc>>,
    /// When the token was issued.
    pub issued_at: Option<DateTime<Utc>>,
    /// Whether the link requires a password.
    pub has_password: bool,
}

impl From<&ShareSettings> for ShareResponse {
    fn from(share: &ShareSettings) -> Self {
        Self {
            enabled: share.is_enabled(),
            token: share.token.clone(),
            expires_at: share.expires_at,
            issued_at: share.issued_at,
            has_password: share.password_hash.is_some(),
        }
    }
}

/// Entry as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryResponse {
    /// Entry ID.
    pub id: EntryId,
    /// Name.
    pub name: String,
    /// "file" or "folder".
    #[serde(rename = "type")]
    pub kind: String,
    /// Containing folder.
    pub parent_id: Option<EntryId>,
    /// Size in bytes (files only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// MIME type (files only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Object key (files only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
    /// Share link state (files only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share: Option<ShareResponse>,
    /// Created at.
    pub created_at: DateTime<Utc>,
    /// Updated at.
    pub updated_at: DateTime<Utc>,
}

impl From<&Entry> for EntryResponse {
    fn from(entry: &Entry) -> Self {
        let (kind, size, mime_type, storage_key, share) = match &entry.kind {
            EntryKind::Folder => ("folder", None, None, None, None),
            EntryKind::File(meta) => (
                "file",
                Some(meta.size),
                Some(meta.mime_type.clone()),
                meta.storage_key.clone(),
                Some(ShareResponse::from(&meta.share)),
            ),
        };
        Self {
            id: entry.id,
            name: entry.name.clone(),
            kind: kind.to_string(),
            parent_id: entry.parent_id,
            size,
            mime_type,
            storage_key,
            share,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

/// Map a slice of entries.
pub fn entry_list(entries: &[Entry]) -> Vec<EntryResponse> {
    entries.iter().map(EntryResponse::from).collect()
}

/// Room summary for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummary {
    /// Room name.
    pub name: String,
    /// Number of entries.
    pub entry_count: usize,
    /// Created at.
    pub created_at: DateTime<Utc>,
    /// Updated at.
    pub updated_at: DateTime<Utc>,
}

impl From<&Room> for RoomSummary {
    fn from(room: &Room) -> Self {
        Self {
            name: room.name.clone(),
            entry_count: room.entries.len(),
            created_at: room.created_at,
            updated_at: room.updated_at,
        }
    }
}

/// Room with its entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomResponse {
    /// Room name.
    pub name: String,
    /// Folder the room's view is positioned in.
    pub current_folder_id: Option<EntryId>,
    /// Every entry of the room.
    pub entries: Vec<EntryResponse>,
    /// Created at.
    pub created_at: DateTime<Utc>,
    /// Updated at.
    pub updated_at: DateTime<Utc>,
}

impl From<&Room> for RoomResponse {
    fn from(room: &Room) -> Self {
        Self {
            name: room.name.clone(),
            current_folder_id: room.current_folder_id,
            entries: entry_list(&room.entries),
            created_at: room.created_at,
            updated_at: room.updated_at,
        }
    }
}

/// Result of a room password check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPasswordResponse {
    /// Whether the password matched.
    pub valid: bool,
}

/// Result of a room deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRoomResponse {
    /// Objects removed from the store.
    pub objects_deleted: u64,
}

/// Result of an entry rename.
#[derive(Debug, Clone, Serialize)]
pub struct RenameResponse {
    /// The renamed entry.
    pub entry: EntryResponse,
    /// Files whose storage key moved.
    pub rekeyed: usize,
    /// Per-action storage results.
    pub storage: ActionReport,
}

impl From<RenameOutcome> for RenameResponse {
    fn from(outcome: RenameOutcome) -> Self {
        Self {
            entry: EntryResponse::from(&outcome.entry),
            rekeyed: outcome.rekeyed,
            storage: outcome.report,
        }
    }
}

/// Result of an entry deletion.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Ids removed from the room.
    pub removed: Vec<EntryId>,
    /// Whether the room's cursor was reset.
    pub cursor_reset: bool,
    /// Per-action storage results.
    pub storage: ActionReport,
}

impl From<DeleteOutcome> for DeleteResponse {
    fn from(outcome: DeleteOutcome) -> Self {
        Self {
            removed: outcome.removed,
            cursor_reset: outcome.cursor_reset,
            storage: outcome.report,
        }
    }
}

/// Signed download link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadUrlResponse {
    /// Time-limited URL.
    pub url: String,
}
