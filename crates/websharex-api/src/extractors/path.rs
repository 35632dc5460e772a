//! Typed path parameter helpers.

use websharex_core::error::AppError;
use websharex_core::types::EntryId;

/// Parses an entry id from a path segment.
pub fn parse_entry_id(s: &str) -> Result<EntryId, AppError> {
    s.parse()
        .map_err(|_| AppError::validation(format!("Invalid entry id: {s}")))
}
