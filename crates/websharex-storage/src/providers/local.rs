//! Local filesystem storage provider.
//!
//! Each key maps to a file below the root directory; `/` in a key becomes a
//! directory separator. Listings walk the tree and return keys in byte order.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use websharex_core::error::{AppError, ErrorKind};
use websharex_core::result::AppResult;
use websharex_core::traits::storage::{ObjectMeta, ObjectPage, StorageProvider};

use super::KeyPrefix;

/// Local filesystem storage provider.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    /// Root directory for all stored objects.
    root: PathBuf,
    /// Namespace below the root.
    prefix: KeyPrefix,
}

impl LocalStorageProvider {
    /// Create a new local storage provider rooted at the given path.
    pub async fn new(root_path: &str, root_prefix: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::StorageUnavailable,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            prefix: KeyPrefix::new(root_prefix),
        })
    }

    /// Resolve a key to an absolute path within the root.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let physical = self.prefix.apply(key);
        let relative = Path::new(&physical);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(AppError::validation(format!("Invalid object key: {key}")));
        }
        Ok(self.root.join(relative))
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::StorageUnavailable,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Walk the namespace and collect every object with its metadata.
    async fn walk(&self) -> AppResult<Vec<ObjectMeta>> {
        let base = self.root.join(self.prefix.apply(""));
        if !base.exists() {
            return Ok(Vec::new());
        }

        let mut objects = Vec::new();
        let mut pending = vec![base.clone()];
        while let Some(dir) = pending.pop() {
            let mut reader = fs::read_dir(&dir).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::StorageUnavailable,
                    format!("Failed to list directory: {}", dir.display()),
                    e,
                )
            })?;

            while let Some(entry) = reader.next_entry().await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::StorageUnavailable,
                    "Failed to read directory entry",
                    e,
                )
            })? {
                let meta = entry.metadata().await.map_err(|e| {
                    AppError::with_source(
                        ErrorKind::StorageUnavailable,
                        "Failed to get entry metadata",
                        e,
                    )
                })?;
                let path = entry.path();
                if meta.is_dir() {
                    pending.push(path);
                    continue;
                }

                let Ok(relative) = path.strip_prefix(&base) else {
                    continue;
                };
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                objects.push(ObjectMeta {
                    key,
                    size_bytes: meta.len(),
                    last_modified: meta.modified().ok().map(chrono::DateTime::<chrono::Utc>::from),
                });
            }
        }

        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.root.exists() && self.root.is_dir())
    }

    async fn list_page(
        &self,
        prefix: &str,
        page_size: usize,
        cursor: Option<String>,
    ) -> AppResult<ObjectPage> {
        let page_size = page_size.max(1);
        let mut matching = self.walk().await?.into_iter().filter(|o| {
            o.key.starts_with(prefix) && cursor.as_deref().is_none_or(|after| o.key.as_str() > after)
        });

        let objects: Vec<ObjectMeta> = matching.by_ref().take(page_size).collect();
        let has_more = matching.next().is_some();
        let next_cursor = if has_more {
            objects.last().map(|o| o.key.clone())
        } else {
            None
        };

        debug!(prefix, count = objects.len(), has_more, "Listed local objects");
        Ok(ObjectPage {
            objects,
            next_cursor,
            has_more,
        })
    }

    async fn put(&self, key: &str, data: Bytes, _content_type: &str) -> AppResult<()> {
        let full_path = self.resolve(key)?;
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::StorageUnavailable,
                format!("Failed to write object: {key}"),
                e,
            )
        })?;

        debug!(key, bytes = data.len(), "Wrote object");
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_path = self.resolve(key)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::StorageUnavailable,
                format!("Failed to delete object: {key}"),
                e,
            )),
        }
    }

    async fn delete_many(&self, keys: &[String]) -> AppResult<()> {
        for key in keys {
            self.delete(key).await?;
        }
        Ok(())
    }

    async fn copy(&self, from: &str, to: &str) -> AppResult<()> {
        let from_path = self.resolve(from)?;
        let to_path = self.resolve(to)?;
        self.ensure_parent(&to_path).await?;

        fs::copy(&from_path, &to_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Object not found: {from}"))
            } else {
                AppError::with_source(
                    ErrorKind::StorageUnavailable,
                    format!("Failed to copy {from} -> {to}"),
                    e,
                )
            }
        })?;
        Ok(())
    }

    async fn signed_url(&self, key: &str, _ttl: Duration) -> AppResult<String> {
        let full_path = self.resolve(key)?;
        if !full_path.is_file() {
            return Err(AppError::not_found(format!("Object not found: {key}")));
        }
        let encoded = full_path
            .to_string_lossy()
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        Ok(format!("file://{encoded}"))
    }
}
