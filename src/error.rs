//! Domain-specific error types for the stow engine.
//!
//! Internal modules return typed errors built with [`thiserror`]; command
//! handlers at the CLI boundary convert them to [`anyhow::Error`] via `?`.
//!
//! The taxonomy follows the severity rules of the engine:
//!
//! - [`ParseError`] — malformed `.stowconfig` content. Fatal only under
//!   `--enforce-integrity`; otherwise the offending entry is dropped with a
//!   warning.
//! - [`ResolutionWarning`] — irregularities found while resolving rules
//!   (zero-match destination globs, destinations shadowed by regular files).
//!   Never fatal on their own.
//! - [`ConflictError`] — a planned destination exists and policy forbids
//!   touching it. Reported per entry; aborts the run only under
//!   `--enforce-integrity`.
//! - [`StowError::Filesystem`] — an I/O failure while mutating the target
//!   tree. Always aborts the remaining plan.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the stow engine.
#[derive(Error, Debug)]
pub enum StowError {
    /// A `.stowconfig` could not be parsed (fatal under `--enforce-integrity`).
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// A planned destination conflicts with existing target state.
    #[error("{0}")]
    Conflict(#[from] ConflictError),

    /// An I/O failure occurred while mutating the target tree.
    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        /// Path being created or replaced when the failure occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The run was aborted by the user declining a confirmation prompt.
    #[error("aborted: {0}")]
    Aborted(String),
}

/// A malformed line or structure in a `.stowconfig` file.
///
/// Carries the 1-based line number of the offending input so diagnostics can
/// point at the exact spot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    /// 1-based line number of the offending input.
    pub line: u32,
    /// What exactly was wrong.
    pub kind: ParseErrorKind,
}

/// The specific grammar violation behind a [`ParseError`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A second `[redirect]` header was encountered.
    #[error("duplicate [redirect] header")]
    DuplicateRedirectHeader,

    /// An `[ignore]` header appeared after the `[redirect]` header.
    #[error("[ignore] header after [redirect] is not supported")]
    IgnoreHeaderAfterRedirect,

    /// A conditional block was still open when a top-level header or
    /// end-of-file was reached.
    #[error("conditional block opened at line {opened_at} is never closed with [end]")]
    UnclosedBlock {
        /// Line the unterminated block header appeared on.
        opened_at: u32,
    },

    /// A conditional block header listed no subjects after the `:::`.
    #[error("conditional block has no subjects")]
    EmptyBlockSubjects,

    /// An `[end]` token appeared with no block open.
    #[error("[end] without a matching block header")]
    StrayEnd,

    /// A line in the redirect section did not match `source ::: destination`.
    #[error("malformed redirect entry {entry:?} (expected \"source ::: destination\")")]
    MalformedRedirect {
        /// The raw offending line.
        entry: String,
    },

    /// A pattern could not be compiled into a glob matcher.
    #[error("invalid pattern {pattern:?}: {message}")]
    InvalidPattern {
        /// The raw pattern text.
        pattern: String,
        /// Error reported by the glob compiler.
        message: String,
    },
}

/// A non-fatal irregularity discovered while resolving rules against the
/// source and target trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionWarning {
    /// Source path (relative to the source root) the warning concerns.
    pub path: PathBuf,
    /// Human-readable description of the irregularity.
    pub message: String,
}

impl std::fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// A planned link that cannot be applied under the active overwrite policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}: {reason}", target.display())]
pub struct ConflictError {
    /// The destination path that is in the way.
    pub target: PathBuf,
    /// Why policy refuses to touch it.
    pub reason: ConflictReason,
}

/// Why a planned destination was refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    /// The destination is a regular file and `--force` was not given.
    #[error("refusing to overwrite regular file (use --force)")]
    RegularFile,

    /// The destination is a real directory; replacing it would destroy a
    /// whole subtree, so no flag overrides this.
    #[error("refusing to replace a real directory")]
    Directory,

    /// The destination is owned by another user and `--overwrite-others`
    /// was not given.
    #[error("owned by uid {uid} (use --overwrite-others)")]
    ForeignOwned {
        /// Owner uid of the existing entry.
        uid: u32,
    },

    /// The destination's parent directory does not exist and parent
    /// creation is disabled.
    #[error("parent directory missing (parent creation disabled)")]
    MissingParent,
}
