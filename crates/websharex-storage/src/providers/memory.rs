//! In-memory storage provider.
//!
//! Objects live in a sorted map. Individual keys can be marked as failing so
//! partial-failure paths can be exercised without a real object store.

use std::collections::{BTreeMap, HashSet};
use std::ops::Bound;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use websharex_core::error::AppError;
use websharex_core::result::AppResult;
use websharex_core::traits::storage::{ObjectMeta, ObjectPage, StorageProvider};

/// A stored object.
#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
    last_modified: DateTime<Utc>,
}

/// In-memory storage provider.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorageProvider {
    objects: Arc<RwLock<BTreeMap<String, StoredObject>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    unavailable: Arc<RwLock<bool>>,
}

impl MemoryStorageProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write, copy, or delete touching `key` fail.
    pub async fn fail_key(&self, key: impl Into<String>) {
        self.failing.write().await.insert(key.into());
    }

    /// Clear all injected key failures.
    pub async fn clear_failures(&self) {
        self.failing.write().await.clear();
    }

    /// Make every call fail, as if the store were unreachable.
    pub async fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().await = unavailable;
    }

    /// Whether an object exists.
    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    /// Read an object's bytes and content type.
    pub async fn get(&self, key: &str) -> Option<(Bytes, String)> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| (o.data.clone(), o.content_type.clone()))
    }

    /// All stored keys in order.
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    async fn check(&self, key: Option<&str>) -> AppResult<()> {
        if *self.unavailable.read().await {
            return Err(AppError::storage("Object store unavailable"));
        }
        if let Some(key) = key {
            if self.failing.read().await.contains(key) {
                return Err(AppError::storage(format!("Injected failure for key: {key}")));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl StorageProvider for MemoryStorageProvider {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(!*self.unavailable.read().await)
    }

    async fn list_page(
        &self,
        prefix: &str,
        page_size: usize,
        cursor: Option<String>,
    ) -> AppResult<ObjectPage> {
        self.check(None).await?;
        let page_size = page_size.max(1);
        let objects = self.objects.read().await;

        let start = match cursor {
            Some(after) => Bound::Excluded(after),
            None => Bound::Included(prefix.to_string()),
        };
        let mut matching = objects
            .range((start, Bound::Unbounded))
            .skip_while(|(key, _)| key.as_str() < prefix)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, object)| ObjectMeta {
                key: key.clone(),
                size_bytes: object.data.len() as u64,
                last_modified: Some(object.last_modified),
            });

        let page: Vec<ObjectMeta> = matching.by_ref().take(page_size).collect();
        let has_more = matching.next().is_some();
        let next_cursor = if has_more {
            page.last().map(|o| o.key.clone())
        } else {
            None
        };

        Ok(ObjectPage {
            objects: page,
            next_cursor,
            has_more,
        })
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<()> {
        self.check(Some(key)).await?;
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.check(Some(key)).await?;
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn delete_many(&self, keys: &[String]) -> AppResult<()> {
        for key in keys {
            self.check(Some(key)).await?;
        }
        let mut objects = self.objects.write().await;
        for key in keys {
            objects.remove(key);
        }
        Ok(())
    }

    async fn copy(&self, from: &str, to: &str) -> AppResult<()> {
        self.check(Some(from)).await?;
        self.check(Some(to)).await?;
        let mut objects = self.objects.write().await;
        let source = objects
            .get(from)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Object not found: {from}")))?;
        objects.insert(
            to.to_string(),
            StoredObject {
                last_modified: Utc::now(),
                ..source
            },
        );
        Ok(())
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> AppResult<String> {
        self.check(Some(key)).await?;
        if !self.contains(key).await {
            return Err(AppError::not_found(format!("Object not found: {key}")));
        }
        let expires = Utc::now().timestamp() + ttl.as_secs() as i64;
        Ok(format!(
            "memory://{}?expires={expires}",
            urlencoding::encode(key)
        ))
    }
}
