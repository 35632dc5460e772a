//! Storage provider implementations.

pub mod local;
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

pub use local::LocalStorageProvider;
pub use memory::MemoryStorageProvider;
#[cfg(feature = "s3")]
pub use s3::S3StorageProvider;

/// Namespace prepended to every key a provider stores.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct KeyPrefix(String);

impl KeyPrefix {
    pub(crate) fn new(root: &str) -> Self {
        let trimmed = root.trim_matches('/');
        if trimmed.is_empty() {
            Self(String::new())
        } else {
            Self(format!("{trimmed}/"))
        }
    }

    /// Physical key for a logical one.
    pub(crate) fn apply(&self, key: &str) -> String {
        format!("{}{}", self.0, key.trim_start_matches('/'))
    }

    /// Logical key for a physical one. Keys outside the namespace pass through.
    pub(crate) fn strip<'a>(&self, key: &'a str) -> &'a str {
        key.strip_prefix(self.0.as_str()).unwrap_or(key)
    }
}
