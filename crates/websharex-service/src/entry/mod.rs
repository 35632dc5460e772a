//! Entry operations: folders, uploads, renames, deletes.

pub mod delete;
pub mod rename;
pub mod service;
pub mod upload;

pub use delete::{DeleteOutcome, DeletePlan, delete_entry, plan_delete};
pub use rename::{RenameOutcome, rename_entry};
pub use service::EntryService;
pub use upload::{UploadFile, guess_mime, upload_files};
