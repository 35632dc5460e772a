//! Entry operations bound to the room store.

use std::sync::Arc;

use tracing::{info, warn};

use websharex_core::error::AppError;
use websharex_core::result::AppResult;
use websharex_core::types::EntryId;
use websharex_entity::entry::{Entry, validate_name};
use websharex_entity::room::Room;

use crate::context::ServiceContext;
use crate::keys;
use crate::tree::PathResolver;

use super::delete::{DeleteOutcome, delete_entry};
use super::rename::{RenameOutcome, rename_entry};
use super::upload::{UploadFile, upload_files};

/// Runs entry operations under the room lock and persists their result.
#[derive(Debug, Clone)]
pub struct EntryService {
    ctx: Arc<ServiceContext>,
}

impl EntryService {
    /// Creates a new entry service.
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// All entries of a room.
    pub async fn list_entries(&self, room: &str) -> AppResult<Vec<Entry>> {
        Ok(self.ctx.load_room(room).await?.entries)
    }

    /// Create an empty folder and write its marker object.
    pub async fn create_folder(
        &self,
        room: &str,
        name: &str,
        parent: Option<EntryId>,
    ) -> AppResult<Entry> {
        let name = validate_name(name)?;
        self.ctx
            .exclusive(room, "create_folder", async {
                let mut state = self.ctx.load_room(room).await?;
                let mut tree = state.tree();

                if let Some(parent_id) = parent {
                    if !tree.is_folder(parent_id) {
                        return Err(AppError::not_found(format!(
                            "Folder {parent_id} not found in room '{room}'"
                        )));
                    }
                }
                if tree.sibling_named(parent, &name, None).is_some() {
                    return Err(AppError::conflict(format!(
                        "An entry named '{name}' already exists here"
                    )));
                }

                let path = PathResolver::new(tree.entries()).container_path(parent)?;
                let folder = Entry::folder(name.as_str(), parent);
                if !path.orphaned {
                    let marker = keys::marker_key(room, &path.child(&name));
                    if let Err(e) = self
                        .ctx
                        .storage
                        .put(&marker, bytes::Bytes::new(), "application/x-directory")
                        .await
                    {
                        warn!(room, key = %marker, error = %e, "Failed to write folder marker");
                    }
                }

                tree.push(folder.clone());
                state.entries = tree.into_entries();
                self.ctx.persist(&state).await?;

                info!(room, entry_id = %folder.id, name = %folder.name, "Created folder");
                Ok(folder)
            })
            .await
    }

    /// Store uploaded files under `parent`.
    pub async fn upload(
        &self,
        room: &str,
        parent: Option<EntryId>,
        files: Vec<UploadFile>,
    ) -> AppResult<Vec<Entry>> {
        self.ctx
            .exclusive(room, "upload", async {
                let mut state = self.ctx.load_room(room).await?;
                let stored =
                    upload_files(&self.ctx.storage, &self.ctx.settings, &mut state, parent, files)
                        .await?;
                self.ctx.persist(&state).await?;
                Ok(stored)
            })
            .await
    }

    /// Rename an entry, moving its objects.
    pub async fn rename(&self, room: &str, id: EntryId, new_name: &str) -> AppResult<RenameOutcome> {
        self.ctx
            .exclusive(room, "rename", async {
                let mut state = self.ctx.load_room(room).await?;
                let outcome =
                    rename_entry(&self.ctx.storage, &self.ctx.settings, &mut state, id, new_name)
                        .await?;
                self.ctx.persist(&state).await?;
                Ok(outcome)
            })
            .await
    }

    /// Delete an entry and its subtree.
    pub async fn delete(&self, room: &str, id: EntryId) -> AppResult<DeleteOutcome> {
        self.ctx
            .exclusive(room, "delete", async {
                let mut state = self.ctx.load_room(room).await?;
                let outcome =
                    delete_entry(&self.ctx.storage, &self.ctx.settings, &mut state, id).await?;
                self.ctx.persist(&state).await?;
                Ok(outcome)
            })
            .await
    }

    /// Move the room's cursor. `None` resets it to the root.
    pub async fn set_current_folder(&self, room: &str, folder: Option<EntryId>) -> AppResult<Room> {
        self.ctx
            .exclusive(room, "set_current_folder", async {
                let mut state = self.ctx.load_room(room).await?;
                if let Some(id) = folder {
                    if !state.tree().is_folder(id) {
                        return Err(AppError::not_found(format!(
                            "Folder {id} not found in room '{room}'"
                        )));
                    }
                }
                state.current_folder_id = folder;
                self.ctx.persist(&state).await
            })
            .await
    }

    /// A signed download URL for a stored file.
    pub async fn download_url(&self, room: &str, id: EntryId) -> AppResult<String> {
        let state = self.ctx.load_room(room).await?;
        let key = state
            .entries
            .iter()
            .find(|e| e.id == id)
            .and_then(|e| e.storage_key())
            .ok_or_else(|| AppError::not_found(format!("No stored file {id} in room '{room}'")))?;
        self.ctx
            .storage
            .signed_url(key, self.ctx.settings.signed_url_ttl)
            .await
    }
}
