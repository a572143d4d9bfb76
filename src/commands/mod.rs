//! Top-level run orchestration for the two modes: linking and `status`.

pub mod link;
pub mod status;

use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};

use crate::cli::GlobalOpts;
use crate::exec::SystemExecutor;
use crate::logging::Log;
use crate::plan::{Plan, Planner};
use crate::platform;
use crate::reconcile::Policy;
use crate::resolve::predicate::EvalContext;

/// Resolve the source root: `--source` or the current directory, which must
/// exist.
fn resolve_source(global: &GlobalOpts) -> Result<PathBuf> {
    let source = match &global.source {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("determining current directory")?,
    };
    std::fs::canonicalize(&source)
        .with_context(|| format!("source directory {} must exist", source.display()))
}

/// Build the plan for one run and surface its diagnostics.
///
/// Under `--enforce-integrity` any parse diagnostic or resolution warning
/// aborts before anything is mutated; otherwise each is logged as a
/// warning.
fn build_plan(
    source: &std::path::Path,
    target: &std::path::Path,
    global: &GlobalOpts,
    log: &dyn Log,
) -> Result<Plan> {
    let oracle = SystemExecutor;
    let ctx = EvalContext {
        oracle: &oracle,
        profile: &global.profile,
    };
    let plan = Planner::new(source, target, &ctx, &global.exclude, global.redirects).plan()?;

    for diagnostic in &plan.diagnostics {
        log.warn(&diagnostic.to_string());
    }
    for warning in &plan.warnings {
        log.warn(&warning.to_string());
    }
    if global.enforce_integrity && !(plan.diagnostics.is_empty() && plan.warnings.is_empty()) {
        log.error("Aborting. Nothing was changed.");
        bail!("config integrity violated (--enforce-integrity)");
    }

    Ok(plan)
}

/// Assemble the overwrite policy from CLI flags and the invoking user.
fn policy(global: &GlobalOpts) -> Policy {
    Policy {
        force: global.force,
        overwrite_others: global.overwrite_others,
        auto_yes: global.yes,
        make_parents: global.parents,
        current_uid: platform::current_uid(),
    }
}
