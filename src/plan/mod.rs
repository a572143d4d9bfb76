//! Tree planning: walk the source tree, consult the rule resolver for every
//! entry, and produce the ordered link plan.
//!
//! The walk is depth-first with directory entries sorted by name, so the
//! plan is deterministic across runs and platforms. The planner reads only
//! the source tree; target state is the reconciler's business. Directories
//! yield no actions of their own — parents are implied by their files and
//! created at execution time — so a directory whose contents are all
//! ignored is never created.

pub mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::config::{self, CONFIG_FILE_NAME};
use crate::error::{ParseError, ResolutionWarning};
use crate::resolve::predicate::EvalContext;
use crate::resolve::{
    FlatRules, ResolveOptions, ResolvedAction, ScopedRules, resolve,
};

/// One planned symlink: `target` → `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLink {
    /// Absolute path of the source file the link will point at.
    pub source: PathBuf,
    /// Source path relative to the source root (for reporting).
    pub rel: PathBuf,
    /// Absolute path the link will be created at.
    pub target: PathBuf,
}

/// A parse diagnostic annotated with the config file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDiagnostic {
    /// The `.stowconfig` file, relative to the source root.
    pub config: PathBuf,
    /// The underlying parse problem.
    pub error: ParseError,
}

impl std::fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.config.display(), self.error)
    }
}

/// The ordered link plan for one run.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    /// Planned links in walk order (parents always precede children).
    pub links: Vec<PlannedLink>,
    /// Non-fatal resolution warnings accumulated during planning.
    pub warnings: Vec<ResolutionWarning>,
    /// Parse diagnostics from every config file encountered.
    pub diagnostics: Vec<ConfigDiagnostic>,
    /// Number of source files excluded by ignore rules.
    pub ignored: usize,
    /// Number of source files considered (ignored or planned).
    pub total_files: usize,
}

/// Walks the source tree and produces a [`Plan`].
pub struct Planner<'a> {
    source_root: &'a Path,
    target_root: &'a Path,
    ctx: &'a EvalContext<'a>,
    /// Source-root-relative paths pruned from the walk (`--exclude`).
    excludes: &'a [PathBuf],
    /// `false` under `--no-redirects`.
    redirects_enabled: bool,
}

impl std::fmt::Debug for Planner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Planner")
            .field("source_root", &self.source_root)
            .field("target_root", &self.target_root)
            .field("excludes", &self.excludes)
            .field("redirects_enabled", &self.redirects_enabled)
            .finish_non_exhaustive()
    }
}

impl<'a> Planner<'a> {
    /// Create a planner for one run.
    #[must_use]
    pub fn new(
        source_root: &'a Path,
        target_root: &'a Path,
        ctx: &'a EvalContext<'a>,
        excludes: &'a [PathBuf],
        redirects_enabled: bool,
    ) -> Self {
        Self {
            source_root,
            target_root,
            ctx,
            excludes,
            redirects_enabled,
        }
    }

    /// Walk the source tree and produce the plan.
    ///
    /// # Errors
    ///
    /// Returns an error if the source tree cannot be read.
    pub fn plan(&self) -> Result<Plan> {
        let mut plan = Plan::default();
        let mut scopes = Vec::new();
        self.walk(self.source_root, Path::new(""), &mut scopes, &mut plan)?;
        Ok(plan)
    }

    fn walk(
        &self,
        dir: &Path,
        rel_dir: &Path,
        scopes: &mut Vec<ScopedRules>,
        plan: &mut Plan,
    ) -> Result<()> {
        let mut entries: Vec<(std::ffi::OsString, bool)> = std::fs::read_dir(dir)
            .with_context(|| format!("reading source directory {}", dir.display()))?
            .filter_map(std::result::Result::ok)
            .filter_map(|e| {
                let ft = e.file_type().ok()?;
                Some((e.file_name(), ft.is_dir()))
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        // A config at this level augments the inherited scope stack for this
        // subtree only.
        let pushed = self.push_scope_if_config(dir, rel_dir, scopes, plan)?;

        let opts = ResolveOptions {
            target_root: self.target_root,
            redirects_enabled: self.redirects_enabled,
        };

        for (name, is_dir) in entries {
            if name == CONFIG_FILE_NAME {
                continue;
            }
            let rel = rel_dir.join(&name);
            if self.is_excluded(&rel) {
                continue;
            }
            if is_dir {
                self.walk(&dir.join(&name), &rel, scopes, plan)?;
                continue;
            }

            plan.total_files += 1;
            let resolution = resolve(scopes, &rel, false, &opts);
            plan.warnings.extend(resolution.warnings);
            match resolution.action {
                ResolvedAction::Ignored => plan.ignored += 1,
                ResolvedAction::Direct => plan.links.push(PlannedLink {
                    source: self.source_root.join(&rel),
                    target: self.target_root.join(&rel),
                    rel,
                }),
                ResolvedAction::Redirected(dirs) => {
                    for dest_dir in dirs {
                        plan.links.push(PlannedLink {
                            source: self.source_root.join(&rel),
                            target: dest_dir.join(&name),
                            rel: rel.clone(),
                        });
                    }
                }
            }
        }

        if pushed {
            scopes.pop();
        }
        Ok(())
    }

    /// Parse and push this directory's `.stowconfig`, if present.
    /// Returns whether a scope was pushed.
    fn push_scope_if_config(
        &self,
        dir: &Path,
        rel_dir: &Path,
        scopes: &mut Vec<ScopedRules>,
        plan: &mut Plan,
    ) -> Result<bool> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if !config_path.is_file() {
            return Ok(false);
        }

        let parsed = config::parse_file(&config_path)?;
        let config_rel = rel_dir.join(CONFIG_FILE_NAME);
        plan.diagnostics
            .extend(parsed.diagnostics.into_iter().map(|error| ConfigDiagnostic {
                config: config_rel.clone(),
                error,
            }));

        let (flat, compile_diags) = FlatRules::compile(&parsed.rules, self.ctx);
        plan.diagnostics
            .extend(compile_diags.into_iter().map(|error| ConfigDiagnostic {
                config: config_rel.clone(),
                error,
            }));

        scopes.push(ScopedRules::new(rel_dir.to_path_buf(), flat));
        Ok(true)
    }

    fn is_excluded(&self, rel: &Path) -> bool {
        self.excludes
            .iter()
            .any(|e| rel == e.as_path() || rel.starts_with(e))
    }
}
