//! Public share links for files.

pub mod service;
pub mod token;

pub use service::{ShareOptions, ShareService, SharedFile};
pub use token::generate_token;
