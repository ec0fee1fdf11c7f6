//! Host directory preparation for the output and patches mounts.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Create the output directory and any missing parents.
///
/// An existing directory is fine.
pub fn ensure_output_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| Error::DirectoryCreation {
        path: path.to_path_buf(),
        source,
    })
}

/// The patches directory must already exist; it is never created here.
pub fn check_patches_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::MissingPatchesDir {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Absolute form of `path` for log lines only. Falls back to the input.
pub fn display_path(path: &Path) -> PathBuf {
    crate::source::absolute_path(path).unwrap_or_else(|_| path.to_path_buf())
}
