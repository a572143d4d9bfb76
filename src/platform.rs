//! Host platform queries: invoking user, home directory.

use std::path::PathBuf;

/// The uid of the invoking user, used to classify foreign-owned target
/// entries. `None` on platforms without unix ownership semantics (every
/// entry is then treated as self-owned).
#[must_use]
pub fn current_uid() -> Option<u32> {
    #[cfg(unix)]
    {
        // /proc/self is owned by the process's effective uid on Linux; fall
        // back to `id -u` elsewhere on unix.
        use std::os::unix::fs::MetadataExt as _;
        if let Ok(meta) = std::fs::metadata("/proc/self") {
            return Some(meta.uid());
        }
        let output = std::process::Command::new("id").arg("-u").output().ok()?;
        if !output.status.success() {
            return None;
        }
        String::from_utf8_lossy(&output.stdout).trim().parse().ok()
    }
    #[cfg(not(unix))]
    {
        None
    }
}

/// The invoking user's home directory, used to abbreviate paths to `~` in
/// the virtual-tree rendering and as the default target for `status`.
#[must_use]
pub fn home_dir() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        std::env::var("USERPROFILE")
            .or_else(|_| std::env::var("HOME"))
            .ok()
            .map(PathBuf::from)
    } else {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn current_uid_is_available_on_unix() {
        assert!(current_uid().is_some(), "uid lookup should succeed on unix");
    }

    #[cfg(unix)]
    #[test]
    fn current_uid_matches_owned_file() {
        use std::os::unix::fs::MetadataExt as _;
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("probe");
        std::fs::write(&file, "x").unwrap();
        let meta = std::fs::metadata(&file).unwrap();
        assert_eq!(current_uid(), Some(meta.uid()));
    }

    #[test]
    fn home_dir_reads_environment() {
        // HOME (or USERPROFILE) is set in any sane test environment.
        assert!(home_dir().is_some());
    }
}
