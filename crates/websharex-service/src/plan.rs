//! Planned storage actions and their execution.
//!
//! Cascading operations first decide every object-store call they need,
//! then run them with bounded fan-out. Each action succeeds or fails on
//! its own; the report tells the caller exactly which ones did what.

use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, warn};

use websharex_core::result::AppResult;
use websharex_core::traits::storage::StorageProvider;

/// Content type written for marker objects.
const MARKER_CONTENT_TYPE: &str = "application/x-directory";

/// One object-store call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StorageAction {
    /// Delete one object.
    Delete { key: String },
    /// Delete every object under a prefix.
    DeletePrefix { prefix: String },
    /// Copy an object to a new key.
    Copy { from: String, to: String },
    /// Write an empty marker object.
    PutMarker { key: String },
}

impl StorageAction {
    async fn run(&self, storage: &dyn StorageProvider, page_size: usize) -> AppResult<()> {
        match self {
            Self::Delete { key } => storage.delete(key).await,
            Self::DeletePrefix { prefix } => storage.delete_prefix(prefix, page_size).await.map(|_| ()),
            Self::Copy { from, to } => storage.copy(from, to).await,
            Self::PutMarker { key } => storage.put(key, Bytes::new(), MARKER_CONTENT_TYPE).await,
        }
    }
}

/// An action that did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedAction {
    /// The action attempted.
    #[serde(flatten)]
    pub action: StorageAction,
    /// Why it failed.
    pub error: String,
}

/// Per-action outcome of an executed plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionReport {
    /// Actions that completed.
    pub succeeded: Vec<StorageAction>,
    /// Actions that failed.
    pub failed: Vec<FailedAction>,
}

impl ActionReport {
    /// Whether every action completed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Append another report.
    pub fn merge(&mut self, other: ActionReport) {
        self.succeeded.extend(other.succeeded);
        self.failed.extend(other.failed);
    }

    /// Whether a copy from `key` failed.
    pub fn copy_failed(&self, key: &str) -> bool {
        self.failed
            .iter()
            .any(|f| matches!(&f.action, StorageAction::Copy { from, .. } if from == key))
    }
}

/// Run every action with at most `concurrency` in flight.
///
/// Never fails as a whole: failures are logged and recorded in the report.
pub async fn execute(
    storage: &Arc<dyn StorageProvider>,
    actions: Vec<StorageAction>,
    concurrency: usize,
    page_size: usize,
) -> ActionReport {
    if actions.is_empty() {
        return ActionReport::default();
    }
    let total = actions.len();

    let outcomes: Vec<(StorageAction, AppResult<()>)> = stream::iter(actions)
        .map(|action| {
            let storage = Arc::clone(storage);
            async move {
                let result = action.run(storage.as_ref(), page_size).await;
                (action, result)
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut report = ActionReport::default();
    for (action, result) in outcomes {
        match result {
            Ok(()) => report.succeeded.push(action),
            Err(e) => {
                warn!(action = ?action, error = %e, "Storage action failed");
                report.failed.push(FailedAction {
                    action,
                    error: e.to_string(),
                });
            }
        }
    }

    debug!(
        total,
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        "Executed storage plan"
    );
    report
}
