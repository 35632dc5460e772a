//! Object storage configuration.

use serde::{Deserialize, Serialize};

/// Which object store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderKind {
    /// Directory tree on the local filesystem.
    #[default]
    Local,
    /// S3-compatible bucket.
    S3,
    /// Process-local map; data is lost on restart.
    Memory,
}

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage backend.
    #[serde(default)]
    pub provider: StorageProviderKind,
    /// Prefix prepended by the provider to every key (empty for none).
    #[serde(default = "default_root_prefix")]
    pub root_prefix: String,
    /// Number of objects requested per listing page.
    #[serde(default = "default_list_page_size")]
    pub list_page_size: usize,
    /// Lifetime of signed download URLs, in seconds.
    #[serde(default = "default_signed_url_ttl")]
    pub signed_url_ttl_seconds: u64,
    /// Maximum upload size in bytes (default 1 GB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Maximum number of storage calls in flight during a cascade.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Local filesystem storage configuration.
    #[serde(default)]
    pub local: LocalStorageConfig,
    /// S3-compatible object storage configuration.
    #[serde(default)]
    pub s3: S3StorageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageProviderKind::default(),
            root_prefix: default_root_prefix(),
            list_page_size: default_list_page_size(),
            signed_url_ttl_seconds: default_signed_url_ttl(),
            max_upload_size_bytes: default_max_upload(),
            concurrency: default_concurrency(),
            local: LocalStorageConfig::default(),
            s3: S3StorageConfig::default(),
        }
    }
}

/// Local filesystem storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    /// Root path for local object storage.
    #[serde(default = "default_local_root")]
    pub root_path: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_local_root(),
        }
    }
}

/// S3-compatible object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3StorageConfig {
    /// S3 endpoint URL (for non-AWS services like MinIO or OSS). Empty for AWS.
    #[serde(default)]
    pub endpoint: String,
    /// Region name.
    #[serde(default = "default_region")]
    pub region: String,
    /// Bucket name.
    #[serde(default)]
    pub bucket: String,
    /// Access key ID.
    #[serde(default)]
    pub access_key: String,
    /// Secret access key.
    #[serde(default)]
    pub secret_key: String,
    /// Use path-style addressing (`endpoint/bucket/key`).
    #[serde(default)]
    pub force_path_style: bool,
}

impl Default for S3StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            region: default_region(),
            bucket: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            force_path_style: false,
        }
    }
}

fn default_root_prefix() -> String {
    "websharex".to_string()
}

fn default_list_page_size() -> usize {
    1000
}

fn default_signed_url_ttl() -> u64 {
    3600
}

fn default_max_upload() -> u64 {
    1_073_741_824 // 1 GB
}

fn default_concurrency() -> usize {
    16
}

fn default_local_root() -> String {
    "./data/storage".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}
