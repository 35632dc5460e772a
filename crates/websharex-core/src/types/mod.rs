//! Core type definitions used across the WebShareX workspace.

pub mod id;

pub use id::*;
