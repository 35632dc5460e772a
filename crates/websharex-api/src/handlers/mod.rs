//! HTTP request handlers grouped by resource.

pub mod entry;
pub mod file;
pub mod health;
pub mod room;
pub mod share;
pub mod sync;
