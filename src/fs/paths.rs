//! Destination directory checks.

use std::path::Path;

use crate::error::{Error, Result};

/// Ensure a destination directory exists and is writable.
///
/// Directories are never created here; the caller chooses them up front.
pub fn check_destination_dir(path: &Path, field: &str) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| Error::ConfigValidation {
        field: field.to_string(),
        message: format!("Cannot access '{}': {}", path.display(), e),
    })?;

    if !metadata.is_dir() {
        return Err(Error::ConfigValidation {
            field: field.to_string(),
            message: format!("'{}' is not a directory", path.display()),
        });
    }

    if metadata.permissions().readonly() {
        return Err(Error::ConfigValidation {
            field: field.to_string(),
            message: format!("'{}' is read-only", path.display()),
        });
    }

    Ok(())
}
