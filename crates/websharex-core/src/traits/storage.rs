//! Object-store trait for pluggable storage backends.
//!
//! Keys are flat strings; "folders" exist only as shared key prefixes.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::result::AppResult;

/// Metadata about a stored object, as returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ObjectMeta {
    /// Object key.
    pub key: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Last modified timestamp, if the backend reports one.
    pub last_modified: Option<DateTime<Utc>>,
}

/// One bounded page of a listing.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ObjectPage {
    /// Objects in this page, in key order.
    pub objects: Vec<ObjectMeta>,
    /// Cursor to pass to the next `list_page` call.
    pub next_cursor: Option<String>,
    /// Whether more pages follow.
    pub has_more: bool,
}

/// Trait for object storage backends.
///
/// Implementations exist for S3-compatible stores, the local filesystem,
/// and an in-memory map. The trait is defined here in `websharex-core` and
/// implemented in `websharex-storage`.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "s3").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// List at most `page_size` objects whose key starts with `prefix`,
    /// continuing after `cursor` when given.
    async fn list_page(
        &self,
        prefix: &str,
        page_size: usize,
        cursor: Option<String>,
    ) -> AppResult<ObjectPage>;

    /// Store an object.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<()>;

    /// Delete an object. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Delete several objects in one call.
    async fn delete_many(&self, keys: &[String]) -> AppResult<()>;

    /// Copy an object to a new key within this provider.
    async fn copy(&self, from: &str, to: &str) -> AppResult<()>;

    /// Produce a time-limited download URL for an object.
    async fn signed_url(&self, key: &str, ttl: Duration) -> AppResult<String>;

    /// List every object under `prefix`, following cursors until exhaustion.
    async fn list_all(&self, prefix: &str, page_size: usize) -> AppResult<Vec<ObjectMeta>> {
        let mut objects = Vec::new();
        let mut cursor = None;
        loop {
            let page = self.list_page(prefix, page_size, cursor).await?;
            objects.extend(page.objects);
            if !page.has_more || page.next_cursor.is_none() {
                break;
            }
            cursor = page.next_cursor;
        }
        Ok(objects)
    }

    /// Delete every object under `prefix`, one listing page at a time.
    ///
    /// Returns the number of objects deleted.
    async fn delete_prefix(&self, prefix: &str, page_size: usize) -> AppResult<u64> {
        let mut deleted = 0u64;
        let mut previous_first: Option<String> = None;
        loop {
            // Always restart from the beginning: the previous page is gone.
            let page = self.list_page(prefix, page_size, None).await?;
            let Some(first) = page.objects.first().map(|o| o.key.clone()) else {
                break;
            };
            if previous_first.as_deref() == Some(first.as_str()) {
                return Err(crate::error::AppError::storage(format!(
                    "Objects under '{prefix}' survived deletion (first: {first})"
                )));
            }
            previous_first = Some(first);
            let keys: Vec<String> = page.objects.into_iter().map(|o| o.key).collect();
            self.delete_many(&keys).await?;
            deleted += keys.len() as u64;
            if !page.has_more {
                break;
            }
        }
        Ok(deleted)
    }
}
