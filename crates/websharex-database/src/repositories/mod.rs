//! Room store seam and its implementations.

pub mod memory;
pub mod room;

use async_trait::async_trait;

use websharex_core::result::AppResult;
use websharex_entity::room::{Room, RoomPatch};

pub use memory::MemoryRoomRepository;
pub use room::RoomRepository;

/// Persistence of room rows, including each room's entry document.
#[async_trait]
pub trait RoomStore: Send + Sync + std::fmt::Debug + 'static {
    /// All rooms ordered by name.
    async fn list_rooms(&self) -> AppResult<Vec<Room>>;

    /// One room by name.
    async fn get_room(&self, name: &str) -> AppResult<Option<Room>>;

    /// Insert an empty room. Fails with `Conflict` when the name is taken.
    async fn create_room(&self, name: &str, password_hash: &str) -> AppResult<Room>;

    /// Apply a patch. Fails with `NotFound` when the room does not exist.
    async fn update_room(&self, name: &str, patch: RoomPatch) -> AppResult<Room>;

    /// Delete a room. Returns whether a row was removed.
    async fn delete_room(&self, name: &str) -> AppResult<bool>;

    /// Check store connectivity.
    async fn health_check(&self) -> AppResult<bool>;
}
