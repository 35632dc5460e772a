//! # websharex-database
//!
//! Room metadata persistence. [`repositories::RoomStore`] is the seam the
//! service layer talks to; it is backed by PostgreSQL in production and by
//! an in-memory map in tests and single-process setups.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::{DatabasePool, connect_room_store};
pub use repositories::{MemoryRoomRepository, RoomRepository, RoomStore};
