//! # websharex-service
//!
//! Business logic for WebShareX rooms. Each service works on one room's
//! entry tree at a time: the tree is loaded, mutated in memory under the
//! room's lock, and written back once after every storage call has settled.
//!
//! Services follow constructor injection: the room store, the object
//! store, and the shared settings travel in one [`ServiceContext`].

pub mod context;
pub mod entry;
pub mod keys;
pub mod lock;
pub mod password;
pub mod plan;
pub mod room;
pub mod share;
pub mod sync;
pub mod tree;

pub use context::{ServiceContext, ServiceSettings};
pub use entry::{DeleteOutcome, EntryService, RenameOutcome, UploadFile};
pub use lock::RoomLocks;
pub use password::PasswordHasher;
pub use plan::{ActionReport, FailedAction, StorageAction};
pub use room::RoomService;
pub use share::{ShareOptions, ShareService, SharedFile};
pub use sync::{ReconcileReport, ReconcileScheduler, ReconcileService};
