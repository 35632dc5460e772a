//! S3-compatible object storage provider.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use websharex_core::config::S3StorageConfig;
use websharex_core::error::AppError;
use websharex_core::result::AppResult;
use websharex_core::traits::storage::{ObjectMeta, ObjectPage, StorageProvider};

use super::KeyPrefix;

/// S3 caps `DeleteObjects` and `ListObjectsV2` at 1000 keys per call.
const MAX_KEYS_PER_REQUEST: usize = 1000;

/// S3-compatible storage provider.
#[derive(Debug, Clone)]
pub struct S3StorageProvider {
    client: Client,
    bucket: String,
    prefix: KeyPrefix,
}

impl S3StorageProvider {
    /// Create a new S3 storage provider.
    pub async fn new(config: &S3StorageConfig, root_prefix: &str) -> AppResult<Self> {
        if config.bucket.is_empty() {
            return Err(AppError::configuration("storage.s3.bucket must be set"));
        }
        info!(
            endpoint = %config.endpoint,
            region = %config.region,
            bucket = %config.bucket,
            "Initializing S3 storage provider"
        );

        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));
        if !config.access_key.is_empty() {
            loader = loader.credentials_provider(Credentials::new(
                config.access_key.clone(),
                config.secret_key.clone(),
                None,
                None,
                "websharex-config",
            ));
        }
        let shared = loader.load().await;

        let mut builder =
            aws_sdk_s3::config::Builder::from(&shared).force_path_style(config.force_path_style);
        if !config.endpoint.is_empty() {
            builder = builder.endpoint_url(config.endpoint.clone());
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            prefix: KeyPrefix::new(root_prefix),
        })
    }

    fn to_meta(&self, object: &aws_sdk_s3::types::Object) -> Option<ObjectMeta> {
        let key = self.prefix.strip(object.key()?).to_string();
        let last_modified = object
            .last_modified()
            .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos()));
        Some(ObjectMeta {
            key,
            size_bytes: object.size().unwrap_or(0).max(0) as u64,
            last_modified,
        })
    }
}

#[async_trait]
impl StorageProvider for S3StorageProvider {
    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn health_check(&self) -> AppResult<bool> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!(bucket = %self.bucket, error = %DisplayErrorContext(&e), "S3 health check failed");
                Ok(false)
            }
        }
    }

    async fn list_page(
        &self,
        prefix: &str,
        page_size: usize,
        cursor: Option<String>,
    ) -> AppResult<ObjectPage> {
        let max_keys = page_size.clamp(1, MAX_KEYS_PER_REQUEST) as i32;
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(self.prefix.apply(prefix))
            .max_keys(max_keys)
            .set_continuation_token(cursor)
            .send()
            .await
            .map_err(|e| {
                AppError::storage(format!(
                    "Failed to list objects under '{prefix}': {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let objects: Vec<ObjectMeta> = output
            .contents()
            .iter()
            .filter_map(|o| self.to_meta(o))
            .collect();
        let next_cursor = output.next_continuation_token().map(str::to_string);
        let has_more = output.is_truncated().unwrap_or(false) && next_cursor.is_some();

        debug!(prefix, count = objects.len(), has_more, "Listed S3 objects");
        Ok(ObjectPage {
            objects,
            next_cursor,
            has_more,
        })
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<()> {
        let size = data.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(self.prefix.apply(key))
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                AppError::storage(format!(
                    "Failed to put object '{key}': {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        debug!(key, bytes = size, "Put S3 object");
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(self.prefix.apply(key))
            .send()
            .await
            .map_err(|e| {
                AppError::storage(format!(
                    "Failed to delete object '{key}': {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }

    async fn delete_many(&self, keys: &[String]) -> AppResult<()> {
        for chunk in keys.chunks(MAX_KEYS_PER_REQUEST) {
            let identifiers = chunk
                .iter()
                .map(|key| {
                    ObjectIdentifier::builder()
                        .key(self.prefix.apply(key))
                        .build()
                        .map_err(|e| AppError::internal(format!("Invalid object identifier: {e}")))
                })
                .collect::<AppResult<Vec<_>>>()?;
            let delete = Delete::builder()
                .set_objects(Some(identifiers))
                .quiet(true)
                .build()
                .map_err(|e| AppError::internal(format!("Invalid delete request: {e}")))?;

            let output = self
                .client
                .delete_objects()
                .bucket(&self.bucket)
                .delete(delete)
                .send()
                .await
                .map_err(|e| {
                    AppError::storage(format!(
                        "Failed to delete {} objects: {}",
                        chunk.len(),
                        DisplayErrorContext(&e)
                    ))
                })?;

            if let Some(first) = output.errors().first() {
                return Err(AppError::storage(format!(
                    "Failed to delete {} of {} objects (first: {})",
                    output.errors().len(),
                    chunk.len(),
                    first.key().unwrap_or("<unknown>")
                )));
            }
        }
        Ok(())
    }

    async fn copy(&self, from: &str, to: &str) -> AppResult<()> {
        let source = format!(
            "{}/{}",
            self.bucket,
            urlencoding::encode(&self.prefix.apply(from))
        );
        self.client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(source)
            .key(self.prefix.apply(to))
            .send()
            .await
            .map_err(|e| {
                AppError::storage(format!(
                    "Failed to copy '{from}' -> '{to}': {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> AppResult<String> {
        let presigning = PresigningConfig::expires_in(ttl)
            .map_err(|e| AppError::validation(format!("Invalid signed URL lifetime: {e}")))?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(self.prefix.apply(key))
            .presigned(presigning)
            .await
            .map_err(|e| {
                AppError::storage(format!(
                    "Failed to sign URL for '{key}': {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(request.uri().to_string())
    }
}
