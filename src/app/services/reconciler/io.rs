//! Write-path helpers: atomic replacement, backups, verbatim copies

use crate::constants;
use crate::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Write content to a path atomically
///
/// The content lands in a temporary file in the destination directory and
/// is renamed over the target, so an interrupted run can never leave a
/// truncated SMET file behind.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| {
        Error::io(
            format!("failed to create temporary file in '{}'", dir.display()),
            e,
        )
    })?;

    temp.write_all(content.as_bytes())
        .map_err(|e| Error::io(format!("failed to write '{}'", path.display()), e))?;

    temp.persist(path)
        .map_err(|e| Error::io(format!("failed to replace '{}'", path.display()), e.error))?;

    Ok(())
}

/// Create a `.bak` sibling for a file unless one already exists
///
/// An existing backup is never overwritten, so across repeated runs the
/// backup keeps the content from before the first edit.
pub fn ensure_backup(path: &Path) -> Result<()> {
    let backup = constants::backup_path(path);

    if backup.exists() {
        debug!("Backup already present: {}", backup.display());
        return Ok(());
    }

    fs::copy(path, &backup).map_err(|e| {
        Error::io(
            format!("failed to create backup '{}'", backup.display()),
            e,
        )
    })?;

    Ok(())
}

/// Copy a file byte-for-byte
pub fn copy_verbatim(source: &Path, dest: &Path) -> Result<()> {
    // fs::copy truncates the destination before reading, so copying a file
    // onto itself would destroy it
    if source == dest {
        return Ok(());
    }

    fs::copy(source, dest).map_err(|e| {
        Error::io(
            format!(
                "failed to copy '{}' to '{}'",
                source.display(),
                dest.display()
            ),
            e,
        )
    })?;

    Ok(())
}
