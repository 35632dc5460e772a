//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use websharex_core::error::AppError;
use websharex_core::types::EntryId;
use websharex_service::ShareOptions;

/// Run a DTO's validation rules, mapping failures to a `Validation` error.
pub fn validate_request<T: Validate>(request: &T) -> Result<(), AppError> {
    request
        .validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))
}

/// Create room request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRoomRequest {
    /// Room name; becomes the room's storage prefix.
    #[validate(length(min = 1, max = 128, message = "Room name must be 1-128 characters"))]
    pub name: String,
    /// Room password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Room password check body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyPasswordRequest {
    /// Password to check.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Create folder request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    /// Folder name.
    pub name: String,
    /// Containing folder; absent for the room root.
    #[serde(default)]
    pub parent_id: Option<EntryId>,
}

/// Rename request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameEntryRequest {
    /// New name.
    pub name: String,
}

/// Cursor update body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetCursorRequest {
    /// Folder to select; absent or null resets to the root.
    #[serde(default)]
    pub folder_id: Option<EntryId>,
}

/// Share settings body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareOptionsRequest {
    /// Whether the link is active.
    pub enabled: bool,
    /// When the link stops working.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Link password.
    #[serde(default)]
    pub password: Option<String>,
}

impl From<ShareOptionsRequest> for ShareOptions {
    fn from(req: ShareOptionsRequest) -> Self {
        Self {
            enabled: req.enabled,
            expires_at: req.expires_at,
            password: req.password,
        }
    }
}

/// Query of a public share access.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareAccessQuery {
    /// Link password, when the link has one.
    #[serde(default)]
    pub password: Option<String>,
}
