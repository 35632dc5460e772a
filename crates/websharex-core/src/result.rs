//! Convenience result type alias for WebShareX.

use crate::error::AppError;

/// A specialized `Result` type for WebShareX operations.
pub type AppResult<T> = Result<T, AppError>;
