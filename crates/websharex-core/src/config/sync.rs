//! Reconciliation and operation deadline configuration.

use serde::{Deserialize, Serialize};

/// Settings for the storage reconciler and room operation deadlines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Deadline for a single room operation, in seconds.
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_seconds: u64,
    /// Period of the background reconcile pass over every room. `0` disables it.
    #[serde(default)]
    pub interval_seconds: u64,
    /// Whether a marker object alone keeps a folder alive during reconciliation.
    #[serde(default)]
    pub keep_marked_folders: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            operation_timeout_seconds: default_operation_timeout(),
            interval_seconds: 0,
            keep_marked_folders: false,
        }
    }
}

fn default_operation_timeout() -> u64 {
    60
}
