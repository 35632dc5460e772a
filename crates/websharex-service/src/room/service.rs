//! Room creation, lookup, password checks, and deletion.

use std::sync::Arc;

use tracing::{info, warn};

use websharex_core::error::AppError;
use websharex_core::result::AppResult;
use websharex_entity::room::Room;

use crate::context::ServiceContext;
use crate::keys;
use crate::password::PasswordHasher;

/// Longest accepted room name, in characters.
const MAX_ROOM_NAME_LEN: usize = 128;

/// Trim and validate a room name. The name becomes the room's storage
/// prefix, so it may not contain `/` or be a relative path component.
pub fn validate_room_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::invalid_name("Room name cannot be empty"));
    }
    if name.contains('/') || name == "." || name == ".." {
        return Err(AppError::invalid_name(format!(
            "Room name '{name}' is not a valid path segment"
        )));
    }
    if name.chars().count() > MAX_ROOM_NAME_LEN {
        return Err(AppError::invalid_name(format!(
            "Room name exceeds {MAX_ROOM_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

/// Manages rooms.
#[derive(Debug, Clone)]
pub struct RoomService {
    ctx: Arc<ServiceContext>,
    hasher: PasswordHasher,
}

impl RoomService {
    /// Creates a new room service.
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self {
            ctx,
            hasher: PasswordHasher::new(),
        }
    }

    /// Create an empty room protected by `password`.
    pub async fn create_room(&self, name: &str, password: &str) -> AppResult<Room> {
        let name = validate_room_name(name)?;
        if password.is_empty() {
            return Err(AppError::validation("Room password cannot be empty"));
        }
        let hash = self.hasher.hash_password(password)?;
        let room = self.ctx.store.create_room(&name, &hash).await?;
        info!(room = %room.name, "Room created");
        Ok(room)
    }

    /// All rooms ordered by name.
    pub async fn list_rooms(&self) -> AppResult<Vec<Room>> {
        self.ctx.store.list_rooms().await
    }

    /// One room, or `NotFound`.
    pub async fn get_room(&self, name: &str) -> AppResult<Room> {
        self.ctx.load_room(name).await
    }

    /// Check a room password. An unknown room is `NotFound`.
    pub async fn verify_password(&self, name: &str, password: &str) -> AppResult<bool> {
        let room = self.ctx.load_room(name).await?;
        self.hasher.verify_password(password, &room.password_hash)
    }

    /// Delete a room record, then every object under its prefix.
    ///
    /// Object removal is best-effort: failures are logged and leave
    /// unreachable objects behind. Returns the number of objects deleted.
    pub async fn delete_room(&self, name: &str) -> AppResult<u64> {
        let deleted = self
            .ctx
            .exclusive(name, "delete_room", async {
                if !self.ctx.store.delete_room(name).await? {
                    return Err(AppError::not_found(format!("Room '{name}' not found")));
                }
                let prefix = keys::room_prefix(name);
                match self
                    .ctx
                    .storage
                    .delete_prefix(&prefix, self.ctx.settings.list_page_size)
                    .await
                {
                    Ok(count) => Ok(count),
                    Err(e) => {
                        warn!(room = name, prefix = %prefix, error = %e, "Failed to delete room objects");
                        Ok(0)
                    }
                }
            })
            .await?;
        self.ctx.locks.forget(name);
        info!(room = name, objects = deleted, "Room deleted");
        Ok(deleted)
    }
}
