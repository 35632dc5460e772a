//! # websharex-storage
//!
//! Object storage providers for WebShareX. Every provider implements
//! [`websharex_core::traits::StorageProvider`] over flat string keys.

pub mod factory;
pub mod providers;

pub use factory::build_provider;
pub use providers::{LocalStorageProvider, MemoryStorageProvider};
#[cfg(feature = "s3")]
pub use providers::S3StorageProvider;
