//! Symlink creation and removal, handling platform differences.

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

/// Create a symlink at `link` pointing to `target`.
///
/// # Errors
///
/// Returns an error if the platform call fails (e.g. missing permissions on
/// Windows without developer mode).
pub fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link).with_context(|| {
            format!(
                "creating symlink {} -> {}",
                link.display(),
                target.display()
            )
        })?;
    }

    #[cfg(windows)]
    {
        let result = if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        };
        result.with_context(|| {
            format!(
                "creating symlink {} -> {}",
                link.display(),
                target.display()
            )
        })?;
    }

    Ok(())
}

/// Remove the entry at `path` (symlink or regular file).
///
/// On Windows, directory symlinks must be removed with `remove_dir`; Rust's
/// `symlink_metadata().is_dir()` returns `false` for symlinks there, so the
/// raw `FILE_ATTRIBUTE_DIRECTORY` flag is checked instead.
///
/// # Errors
///
/// Returns an error if the entry's metadata cannot be read or removal fails.
pub fn remove_entry(path: &Path) -> Result<()> {
    let meta = std::fs::symlink_metadata(path)
        .with_context(|| format!("reading metadata: {}", path.display()))?;
    if is_dir_like(&meta) {
        std::fs::remove_dir(path)
            .with_context(|| format!("removing directory entry: {}", path.display()))?;
    } else {
        std::fs::remove_file(path).with_context(|| format!("removing file: {}", path.display()))?;
    }
    Ok(())
}

/// Check if metadata represents a directory-like entry.
fn is_dir_like(meta: &std::fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt as _;
        meta.file_attributes() & 0x10 != 0 // FILE_ATTRIBUTE_DIRECTORY
    }
    #[cfg(not(windows))]
    {
        meta.is_dir()
    }
}

/// Compare two paths for equality, handling UNC prefix normalisation on
/// Windows.
#[must_use]
pub fn paths_equal(a: &Path, b: &Path) -> bool {
    normalize(a) == normalize(b)
}

fn normalize(p: &Path) -> PathBuf {
    #[cfg(windows)]
    {
        let s = p.to_string_lossy();
        if let Some(stripped) = s.strip_prefix(r"\\?\") {
            return PathBuf::from(stripped);
        }
    }
    p.to_path_buf()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn paths_equal_works() {
        assert!(paths_equal(Path::new("/tmp/test"), Path::new("/tmp/test")));
        assert!(!paths_equal(Path::new("/tmp/test"), Path::new("/tmp/other")));
    }

    #[cfg(unix)]
    #[test]
    fn create_and_remove_file_symlink() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("source");
        let link = tmp.path().join("link");
        std::fs::write(&source, "content").unwrap();

        create_symlink(&source, &link).unwrap();
        assert_eq!(std::fs::read_link(&link).unwrap(), source);

        remove_entry(&link).unwrap();
        assert!(!link.exists());
        assert!(source.exists(), "removal must not touch the source");
    }

    #[cfg(unix)]
    #[test]
    fn remove_entry_removes_regular_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("file");
        std::fs::write(&file, "x").unwrap();
        remove_entry(&file).unwrap();
        assert!(!file.exists());
    }

    #[cfg(unix)]
    #[test]
    fn remove_entry_on_broken_symlink() {
        let tmp = tempfile::tempdir().unwrap();
        let link = tmp.path().join("dangling");
        std::os::unix::fs::symlink(tmp.path().join("gone"), &link).unwrap();
        remove_entry(&link).unwrap();
        assert!(std::fs::symlink_metadata(&link).is_err());
    }

    #[test]
    fn remove_entry_missing_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(remove_entry(&tmp.path().join("missing")).is_err());
    }
}
