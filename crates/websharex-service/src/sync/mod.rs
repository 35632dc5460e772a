//! Reconciliation of room metadata against the object store.

pub mod reconciler;
pub mod scheduler;
pub mod service;

pub use reconciler::{Listing, ReconcileReport, reconcile_entries};
pub use scheduler::ReconcileScheduler;
pub use service::{ReconcileService, RoomReconcile};
