//! Rule resolution: deciding, per source path, whether it is ignored and
//! where it links to.
//!
//! Resolution happens in two passes over a flattened, order-preserving rule
//! list (conditional blocks whose predicate fails are excluded wholesale):
//!
//! 1. scan ignore entries in file order, keeping a state that each matching
//!    entry overwrites (`!negate`) — the last match wins, so an un-ignore
//!    only reverses an ignore that precedes it;
//! 2. scan redirect entries in file order and let the *last* matching entry
//!    determine the destination pattern, which is then expanded against the
//!    target tree.
//!
//! The two passes interact with one asymmetry: an ignore that names the
//! path exactly always wins, but a directory-level ignore does not suppress
//! a path claimed by a redirect — redirects conceptually relocate the file
//! out of the directory before directory-level trimming applies.
//!
//! Flattening is redone on every run: predicates depend on runtime context
//! and are never cached.

pub mod matcher;
pub mod predicate;

use std::path::{Path, PathBuf};

use crate::config::{BodyEntry, IgnoreEntry, RedirectEntry, RuleEntry, RuleSet};
use crate::error::{ParseError, ParseErrorKind, ResolutionWarning};

use matcher::{MatchKind, Pattern, expand_destination};
use predicate::EvalContext;

pub use predicate::evaluate;

/// A compiled ignore/un-ignore rule.
#[derive(Debug, Clone)]
struct FlatIgnore {
    pattern: Pattern,
    negate: bool,
}

/// A compiled redirect rule.
#[derive(Debug, Clone)]
struct FlatRedirect {
    source: Pattern,
    dest: String,
}

/// One config file's rules, flattened for the current run.
///
/// Conditional blocks have been filtered by their predicates and their
/// bodies spliced in place, so entry order still mirrors the source file.
#[derive(Debug, Clone, Default)]
pub struct FlatRules {
    ignores: Vec<FlatIgnore>,
    redirects: Vec<FlatRedirect>,
}

impl FlatRules {
    /// Flatten `rules` under the given runtime context.
    ///
    /// Patterns that fail to compile are reported as diagnostics and
    /// dropped, mirroring the parser's skip-with-warning behaviour.
    #[must_use]
    pub fn compile(rules: &RuleSet, ctx: &EvalContext<'_>) -> (Self, Vec<ParseError>) {
        let mut flat = Self::default();
        let mut diagnostics = Vec::new();

        for entry in &rules.entries {
            match entry {
                RuleEntry::Ignore(e) => flat.push_ignore(e, &mut diagnostics),
                RuleEntry::Redirect(e) => flat.push_redirect(e, &mut diagnostics),
                RuleEntry::Block(block) => {
                    if evaluate(block.kind, &block.subjects, ctx) {
                        for body in &block.body {
                            match body {
                                BodyEntry::Ignore(e) => flat.push_ignore(e, &mut diagnostics),
                                BodyEntry::Redirect(e) => flat.push_redirect(e, &mut diagnostics),
                            }
                        }
                    }
                }
            }
        }

        (flat, diagnostics)
    }

    /// `true` if nothing survived flattening.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ignores.is_empty() && self.redirects.is_empty()
    }

    fn push_ignore(&mut self, entry: &IgnoreEntry, diagnostics: &mut Vec<ParseError>) {
        if let Some(pattern) = compile_pattern(&entry.pattern, entry.origin_line, diagnostics) {
            self.ignores.push(FlatIgnore {
                pattern,
                negate: entry.negate,
            });
        }
    }

    fn push_redirect(&mut self, entry: &RedirectEntry, diagnostics: &mut Vec<ParseError>) {
        if let Some(source) =
            compile_pattern(&entry.source_pattern, entry.origin_line, diagnostics)
        {
            self.redirects.push(FlatRedirect {
                source,
                dest: entry.dest_pattern.clone(),
            });
        }
    }
}

fn compile_pattern(
    pattern: &str,
    origin_line: u32,
    diagnostics: &mut Vec<ParseError>,
) -> Option<Pattern> {
    if pattern.is_empty() {
        diagnostics.push(ParseError {
            line: origin_line,
            kind: ParseErrorKind::InvalidPattern {
                pattern: pattern.to_string(),
                message: "empty pattern".to_string(),
            },
        });
        return None;
    }
    match Pattern::new(pattern) {
        Ok(p) => Some(p),
        Err(e) => {
            diagnostics.push(ParseError {
                line: origin_line,
                kind: ParseErrorKind::InvalidPattern {
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                },
            });
            None
        }
    }
}

/// A flattened rule set bound to the directory (relative to the source
/// root) whose `.stowconfig` produced it.
///
/// Patterns inside are matched against paths relative to that directory, so
/// a nested config only ever affects its own subtree.
#[derive(Debug, Clone)]
pub struct ScopedRules {
    /// Directory the config file lives in, relative to the source root.
    pub base: PathBuf,
    /// The flattened rules.
    pub flat: FlatRules,
}

impl ScopedRules {
    /// Bind `flat` to the config directory `base`.
    #[must_use]
    pub fn new(base: PathBuf, flat: FlatRules) -> Self {
        Self { base, flat }
    }
}

/// What resolution decided for one concrete source path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAction {
    /// The path is excluded from the plan.
    Ignored,
    /// The path links to its source-relative position under the target root.
    Direct,
    /// The path links under each of the listed destination directories
    /// (absolute). An empty list is valid: a zero-match destination glob
    /// drops the file with a warning.
    Redirected(Vec<PathBuf>),
}

/// A resolved action plus any warnings produced while resolving it.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The decision for this path.
    pub action: ResolvedAction,
    /// Non-fatal irregularities (zero-match globs, shadowed destinations).
    pub warnings: Vec<ResolutionWarning>,
}

/// Options threaded into per-path resolution.
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions<'a> {
    /// Root of the target tree (for destination expansion).
    pub target_root: &'a Path,
    /// `false` under `--no-redirects`: skip redirect processing entirely.
    pub redirects_enabled: bool,
}

/// Resolve one source path against the active config scopes.
///
/// `scopes` must be ordered outermost-first; only scopes whose base is an
/// ancestor of (or equal to) `rel`'s directory participate, which the
/// planner guarantees by construction. `rel` is relative to the source root.
#[must_use]
pub fn resolve(
    scopes: &[ScopedRules],
    rel: &Path,
    is_dir: bool,
    opts: &ResolveOptions<'_>,
) -> Resolution {
    let mut warnings = Vec::new();

    let ignore = ignore_state(scopes, rel, is_dir);
    if ignore == IgnoreState::Exact {
        return Resolution {
            action: ResolvedAction::Ignored,
            warnings,
        };
    }
    let fallthrough = if ignore == IgnoreState::ByAncestor {
        ResolvedAction::Ignored
    } else {
        ResolvedAction::Direct
    };

    if !opts.redirects_enabled {
        return Resolution {
            action: fallthrough,
            warnings,
        };
    }

    // Last matching redirect entry wins, across all scopes in order.
    let mut winner: Option<(&FlatRedirect, MatchKind)> = None;
    for scope in scopes {
        let Ok(scoped_rel) = rel.strip_prefix(&scope.base) else {
            continue;
        };
        for redirect in &scope.flat.redirects {
            let kind = redirect.source.match_path(scoped_rel, is_dir);
            if kind != MatchKind::None {
                winner = Some((redirect, kind));
            }
        }
    }

    let Some((redirect, kind)) = winner else {
        return Resolution {
            action: fallthrough,
            warnings,
        };
    };

    let expansion = match expand_destination(&redirect.dest, opts.target_root) {
        Ok(expansion) => expansion,
        Err(e) => {
            warnings.push(ResolutionWarning {
                path: rel.to_path_buf(),
                message: format!(
                    "invalid destination pattern {:?}: {e}; entry dropped",
                    redirect.dest
                ),
            });
            return Resolution {
                action: ResolvedAction::Redirected(Vec::new()),
                warnings,
            };
        }
    };

    if expansion.had_glob && expansion.dirs.is_empty() {
        warnings.push(ResolutionWarning {
            path: rel.to_path_buf(),
            message: format!(
                "destination pattern {:?} matched no existing directories; dropped",
                redirect.dest
            ),
        });
    }

    let mut dirs = Vec::new();
    for dir in expansion.dirs {
        let dest_dir = match &kind {
            MatchKind::Ancestor(ancestor) => rebase_under_ancestor(&dir, ancestor, rel, scopes),
            _ => Some(dir.clone()),
        };
        let Some(dest_dir) = dest_dir else { continue };
        if dest_dir.exists() && !dest_dir.is_dir() {
            warnings.push(ResolutionWarning {
                path: rel.to_path_buf(),
                message: format!(
                    "destination {} is an existing regular file; dropped",
                    dest_dir.display()
                ),
            });
            continue;
        }
        dirs.push(dest_dir);
    }

    Resolution {
        action: ResolvedAction::Redirected(dirs),
        warnings,
    }
}

/// How the ignore pass left a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IgnoreState {
    /// Not ignored.
    No,
    /// The winning entry named the path itself.
    Exact,
    /// The winning entry matched an ancestor directory.
    ByAncestor,
}

/// Final ignore state of `rel` after scanning every scope's entries in file
/// order. Later matches always override earlier ones.
fn ignore_state(scopes: &[ScopedRules], rel: &Path, is_dir: bool) -> IgnoreState {
    let mut state = IgnoreState::No;
    for scope in scopes {
        let Ok(scoped_rel) = rel.strip_prefix(&scope.base) else {
            continue;
        };
        for ignore in &scope.flat.ignores {
            match ignore.pattern.match_path(scoped_rel, is_dir) {
                MatchKind::None => {}
                _ if ignore.negate => state = IgnoreState::No,
                MatchKind::Exact => state = IgnoreState::Exact,
                MatchKind::Ancestor(_) => state = IgnoreState::ByAncestor,
            }
        }
    }
    state
}

/// Destination directory for a path covered by a *directory* redirect: the
/// matched directory keeps its own name under the resolved destination and
/// the path's intermediate components follow beneath it.
fn rebase_under_ancestor(
    dest: &Path,
    ancestor: &Path,
    rel: &Path,
    scopes: &[ScopedRules],
) -> Option<PathBuf> {
    // `ancestor` is relative to the scope that matched; recover the same
    // scoped view of `rel` by locating a scope whose stripped path still
    // starts with the ancestor.
    for scope in scopes {
        if let Ok(scoped_rel) = rel.strip_prefix(&scope.base)
            && let Ok(below) = scoped_rel.strip_prefix(ancestor)
        {
            let mut out = dest.join(ancestor.file_name()?);
            if let Some(parent) = below.parent()
                && !parent.as_os_str().is_empty()
            {
                out.push(parent);
            }
            return Some(out);
        }
    }
    None
}
