//! In-memory room repository.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use websharex_core::error::AppError;
use websharex_core::result::AppResult;
use websharex_entity::room::{Room, RoomPatch};

use super::RoomStore;

/// Room store backed by a process-local map.
#[derive(Debug, Clone, Default)]
pub struct MemoryRoomRepository {
    rooms: Arc<RwLock<BTreeMap<String, Room>>>,
}

impl MemoryRoomRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for MemoryRoomRepository {
    async fn list_rooms(&self) -> AppResult<Vec<Room>> {
        Ok(self.rooms.read().await.values().cloned().collect())
    }

    async fn get_room(&self, name: &str) -> AppResult<Option<Room>> {
        Ok(self.rooms.read().await.get(name).cloned())
    }

    async fn create_room(&self, name: &str, password_hash: &str) -> AppResult<Room> {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(name) {
            return Err(AppError::conflict(format!("Room '{name}' already exists")));
        }
        let room = Room::new(name, password_hash);
        rooms.insert(name.to_string(), room.clone());
        Ok(room)
    }

    async fn update_room(&self, name: &str, patch: RoomPatch) -> AppResult<Room> {
        let mut rooms = self.rooms.write().await;
        let room = rooms
            .get_mut(name)
            .ok_or_else(|| AppError::not_found(format!("Room '{name}' not found")))?;
        room.apply(patch);
        Ok(room.clone())
    }

    async fn delete_room(&self, name: &str) -> AppResult<bool> {
        Ok(self.rooms.write().await.remove(name).is_some())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
