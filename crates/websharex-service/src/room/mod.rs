//! Room lifecycle.

pub mod service;

pub use service::{RoomService, validate_room_name};
