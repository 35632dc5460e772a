//! Construct the configured storage provider.

use std::sync::Arc;

use tracing::info;

use websharex_core::config::{StorageConfig, StorageProviderKind};
use websharex_core::result::AppResult;
use websharex_core::traits::storage::StorageProvider;

use crate::providers::{LocalStorageProvider, MemoryStorageProvider};

/// Build the provider selected by `storage.provider`.
pub async fn build_provider(config: &StorageConfig) -> AppResult<Arc<dyn StorageProvider>> {
    let provider: Arc<dyn StorageProvider> = match config.provider {
        StorageProviderKind::Local => Arc::new(
            LocalStorageProvider::new(&config.local.root_path, &config.root_prefix).await?,
        ),
        StorageProviderKind::Memory => Arc::new(MemoryStorageProvider::new()),
        #[cfg(feature = "s3")]
        StorageProviderKind::S3 => Arc::new(
            crate::providers::S3StorageProvider::new(&config.s3, &config.root_prefix).await?,
        ),
        #[cfg(not(feature = "s3"))]
        StorageProviderKind::S3 => {
            return Err(websharex_core::error::AppError::configuration(
                "S3 storage requires the 's3' feature",
            ));
        }
    };

    info!(
        provider = provider.provider_type(),
        root_prefix = %config.root_prefix,
        "Storage provider ready"
    );
    Ok(provider)
}
