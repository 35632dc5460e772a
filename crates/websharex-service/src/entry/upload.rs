//! File uploads into a room.

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{self, TryStreamExt};
use tracing::info;

use websharex_core::error::AppError;
use websharex_core::result::AppResult;
use websharex_core::traits::storage::StorageProvider;
use websharex_core::types::EntryId;
use websharex_entity::entry::{Entry, EntryKind, FileMeta, ShareSettings, validate_name};
use websharex_entity::room::Room;

use crate::context::ServiceSettings;
use crate::keys;
use crate::tree::PathResolver;

/// One file to store.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Original file name.
    pub name: String,
    /// Declared content type, if the client sent one.
    pub content_type: Option<String>,
    /// File contents.
    pub data: Bytes,
}

/// A validated upload bound to its object key.
struct PreparedUpload {
    name: String,
    key: String,
    content_type: String,
    data: Bytes,
}

/// Guess a content type from a file name.
pub fn guess_mime(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Store `files` under `parent` and record them in `room`.
///
/// All objects are written before any metadata changes; if one write
/// fails the whole upload fails and `room` is untouched. A file whose key
/// is already owned by an entry updates that entry in place. The caller
/// persists.
pub async fn upload_files(
    storage: &Arc<dyn StorageProvider>,
    settings: &ServiceSettings,
    room: &mut Room,
    parent: Option<EntryId>,
    files: Vec<UploadFile>,
) -> AppResult<Vec<Entry>> {
    if files.is_empty() {
        return Err(AppError::validation("No files to upload"));
    }

    let tree = room.tree();
    if let Some(parent_id) = parent {
        if !tree.is_folder(parent_id) {
            return Err(AppError::not_found(format!(
                "Folder {parent_id} not found in room '{}'",
                room.name
            )));
        }
    }
    let path = PathResolver::new(tree.entries()).container_path(parent)?;
    if path.orphaned {
        return Err(AppError::validation(format!(
            "Folder {parent:?} is detached from the room root"
        )));
    }

    let mut seen = HashSet::new();
    let mut prepared = Vec::with_capacity(files.len());
    for file in files {
        let name = validate_name(&file.name)?;
        if !seen.insert(name.clone()) {
            return Err(AppError::validation(format!(
                "File '{name}' appears more than once in this upload"
            )));
        }
        if file.data.len() as u64 > settings.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File '{name}' exceeds the {} byte upload limit",
                settings.max_upload_size_bytes
            )));
        }
        if tree
            .sibling_named(parent, &name, None)
            .is_some_and(Entry::is_folder)
        {
            return Err(AppError::conflict(format!(
                "A folder named '{name}' already exists here"
            )));
        }
        let content_type = file
            .content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| guess_mime(&name));
        prepared.push(PreparedUpload {
            key: keys::object_key(&room.name, &path.segments, &name),
            name,
            content_type,
            data: file.data,
        });
    }

    stream::iter(prepared.iter().map(Ok::<_, AppError>))
        .try_for_each_concurrent(settings.concurrency, |upload| {
            let storage = Arc::clone(storage);
            async move {
                storage
                    .put(&upload.key, upload.data.clone(), &upload.content_type)
                    .await
            }
        })
        .await?;

    let mut tree = tree;
    let mut stored = Vec::with_capacity(prepared.len());
    for upload in prepared {
        let meta = FileMeta {
            size: upload.data.len() as u64,
            mime_type: upload.content_type,
            storage_key: Some(upload.key.clone()),
            share: ShareSettings::default(),
        };

        let existing = tree
            .find_by_storage_key(&upload.key)
            .or_else(|| tree.sibling_named(parent, &upload.name, None))
            .map(|e| e.id);
        let entry = match existing.and_then(|id| tree.get_mut(id)) {
            Some(entry) => {
                let share = entry.file_meta().map(|m| m.share.clone()).unwrap_or_default();
                entry.name = upload.name;
                entry.parent_id = parent;
                entry.kind = EntryKind::File(FileMeta { share, ..meta });
                entry.touch();
                entry.clone()
            }
            None => {
                let entry = Entry::file(upload.name, parent, meta);
                tree.push(entry.clone());
                entry
            }
        };
        stored.push(entry);
    }
    room.entries = tree.into_entries();

    info!(room = %room.name, count = stored.len(), "Uploaded files");
    Ok(stored)
}
