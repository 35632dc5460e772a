//! Core traits defined in `websharex-core` and implemented by other crates.

pub mod storage;

pub use storage::{ObjectMeta, ObjectPage, StorageProvider};
