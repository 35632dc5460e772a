//! Tree walks shared by every structural operation.

pub mod cascade;
pub mod path;

pub use cascade::{descendants_of, descendants_of_all};
pub use path::{EntryPath, PathResolver};
