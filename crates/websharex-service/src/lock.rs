//! Per-room operation serialization.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of one async mutex per room name.
///
/// Every operation that reads and rewrites a room's entries holds the
/// room's guard for its whole duration.
#[derive(Debug, Clone, Default)]
pub struct RoomLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl RoomLocks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a room.
    pub async fn acquire(&self, room: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(room.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Drop the lock of a deleted room if nobody holds it.
    pub fn forget(&self, room: &str) {
        self.locks
            .remove_if(room, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Number of rooms with a registered lock.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no room has a registered lock.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
