//! Path matching for ignore/redirect patterns.
//!
//! Source-side patterns match a concrete relative path against the known,
//! enumerable source tree. A pattern that matches a directory implicitly
//! covers everything under it. Destination-side patterns are expanded
//! against the *target* filesystem: glob segments keep only existing
//! directories whose name matches, while literal segments may name
//! directories that do not exist yet (they are created at execution time).

use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};

/// How a pattern relates to a concrete relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchKind {
    /// No match.
    None,
    /// The pattern matches the path itself.
    Exact,
    /// The pattern matches an ancestor directory of the path; the payload is
    /// that ancestor (relative, same base as the queried path).
    Ancestor(PathBuf),
}

/// A compiled source-side pattern.
///
/// `*` wildcards never cross `/`; `**` spans segments. A trailing `/`
/// restricts the pattern to directories.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    dir_only: bool,
    glob: GlobMatcher,
}

impl Pattern {
    /// Compile a pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the glob syntax is invalid.
    pub fn new(pattern: &str) -> Result<Self, globset::Error> {
        let dir_only = pattern.ends_with('/');
        let trimmed = pattern.trim_end_matches('/');
        let glob = GlobBuilder::new(trimmed)
            .literal_separator(true)
            .build()?
            .compile_matcher();
        Ok(Self {
            raw: pattern.to_string(),
            dir_only,
            glob,
        })
    }

    /// The pattern as written in the config file.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Match `rel` (a path relative to the pattern's config directory)
    /// against this pattern. `is_dir` states whether `rel` itself is a
    /// directory, which only matters for trailing-slash patterns.
    ///
    /// Ancestor matches are reported shallowest-first: the outermost
    /// matching directory wins, covering the whole subtree under it.
    #[must_use]
    pub fn match_path(&self, rel: &Path, is_dir: bool) -> MatchKind {
        if self.glob.is_match(rel) && (is_dir || !self.dir_only) {
            return MatchKind::Exact;
        }
        for ancestor in proper_ancestors(rel) {
            if self.glob.is_match(&ancestor) {
                return MatchKind::Ancestor(ancestor);
            }
        }
        MatchKind::None
    }
}

/// Proper ancestors of `rel`, shallowest first (`a/b/c` → `a`, `a/b`).
fn proper_ancestors(rel: &Path) -> Vec<PathBuf> {
    let components: Vec<Component<'_>> = rel.components().collect();
    let mut out = Vec::new();
    let mut prefix = PathBuf::new();
    for component in components.iter().take(components.len().saturating_sub(1)) {
        prefix.push(component.as_os_str());
        out.push(prefix.clone());
    }
    out
}

/// Result of expanding a destination pattern against the target tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// Resolved destination directories, lexicographically ordered. May be
    /// empty when a glob segment matched nothing.
    pub dirs: Vec<PathBuf>,
    /// Whether the pattern contained any glob segment.
    pub had_glob: bool,
}

/// Expand a destination directory pattern.
///
/// Relative patterns are anchored at `target_root`; absolute patterns stand
/// on their own. `.` segments are dropped, so a destination of `.` resolves
/// to the target root itself.
///
/// # Errors
///
/// Returns an error if a glob segment has invalid syntax.
pub fn expand_destination(pattern: &str, target_root: &Path) -> Result<Expansion, globset::Error> {
    let base = if pattern.starts_with('/') {
        PathBuf::from("/")
    } else {
        target_root.to_path_buf()
    };

    let mut candidates = vec![base];
    let mut had_glob = false;

    for segment in pattern.split('/').filter(|s| !s.is_empty() && *s != ".") {
        if has_glob_meta(segment) {
            had_glob = true;
            let matcher = GlobBuilder::new(segment)
                .literal_separator(true)
                .build()?
                .compile_matcher();
            let mut next = Vec::new();
            for candidate in &candidates {
                let Ok(entries) = std::fs::read_dir(candidate) else {
                    continue;
                };
                let mut matched: Vec<PathBuf> = entries
                    .filter_map(Result::ok)
                    .map(|e| e.path())
                    .filter(|p| p.is_dir())
                    .filter(|p| p.file_name().is_some_and(|n| matcher.is_match(n)))
                    .collect();
                matched.sort();
                next.extend(matched);
            }
            candidates = next;
        } else {
            for candidate in &mut candidates {
                candidate.push(segment);
            }
        }
    }

    candidates.sort();
    Ok(Expansion {
        dirs: candidates,
        had_glob,
    })
}

/// `true` if the segment contains glob metacharacters.
fn has_glob_meta(segment: &str) -> bool {
    segment.contains(['*', '?', '['])
}
