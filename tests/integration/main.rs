//! HTTP-level integration tests over in-memory backends.

mod helpers;

mod entries_test;
mod rooms_test;
mod share_test;
mod sync_test;
