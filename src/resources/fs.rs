//! Small filesystem helpers.

use std::path::Path;

use anyhow::{Context as _, Result};

/// Ensure the parent directory of `path` exists, creating missing
/// components as needed.
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}
