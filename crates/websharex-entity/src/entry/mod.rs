//! Entry domain entities.

pub mod model;
pub mod name;
pub mod tree;

pub use model::{Entry, EntryKind, FileMeta, ShareSettings};
pub use name::{MARKER_NAME, validate_name};
pub use tree::{EntryTree, TreeViolation};
