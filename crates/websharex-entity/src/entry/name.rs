//! Entry name rules.

use websharex_core::error::AppError;
use websharex_core::result::AppResult;

/// File name of the zero-byte placeholder that keeps an empty folder prefix
/// visible in the object store.
pub const MARKER_NAME: &str = ".keepfolder";

/// Trim and validate a user-supplied entry name.
///
/// Returns the trimmed name, or an `InvalidName` error when the name is
/// empty, contains a path separator, is a relative path component, or
/// collides with the marker object name.
pub fn validate_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::invalid_name("Name cannot be empty"));
    }
    if name.contains('/') {
        return Err(AppError::invalid_name(format!(
            "Name '{name}' cannot contain '/'"
        )));
    }
    if name == "." || name == ".." {
        return Err(AppError::invalid_name(format!("Name '{name}' is reserved")));
    }
    if name == MARKER_NAME {
        return Err(AppError::invalid_name(format!(
            "Name '{MARKER_NAME}' is reserved for folder markers"
        )));
    }
    Ok(name.to_string())
}
