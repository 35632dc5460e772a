//! # websharex-core
//!
//! Core crate for WebShareX. Contains the configuration schemas, typed
//! identifiers, the object-store trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other WebShareX crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
