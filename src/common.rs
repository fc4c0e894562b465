use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Error unless the file already exists. The message names the expected path
/// and exact filename so a misplaced export is easy to spot.
pub(crate) fn require_file_exists(path: &Path) -> Result<()> {
    if !path.is_file() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        anyhow::bail!(
            "Missing input file: {} (expected a file with this exact name: {name})",
            path.display()
        );
    }
    Ok(())
}

/// Create the parent directory of `path` if it doesn't exist.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}
