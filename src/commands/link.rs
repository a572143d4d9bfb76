//! The default run mode: plan, reconcile, and apply symlinks.

use anyhow::{Context as _, Result, bail};

use crate::apply::{self, ApplyError};
use crate::cli::GlobalOpts;
use crate::logging::Log;
use crate::prompt::{AutoConfirm, Confirm, StdinConfirm};
use crate::reconcile;

/// Run the linking mode.
///
/// # Errors
///
/// Returns an error when the source or target is invalid, integrity
/// enforcement rejects the config, the user declines a prompt, or a
/// filesystem operation fails.
pub fn run(global: &GlobalOpts, log: &dyn Log) -> Result<()> {
    let source = super::resolve_source(global)?;
    let Some(target) = &global.target else {
        bail!("target must be set for linking runs (use --target)");
    };
    let target = std::fs::canonicalize(target)
        .with_context(|| format!("target directory {} must exist", target.display()))?;
    if source == target {
        bail!("source cannot be the same as the target");
    }

    let plan = super::build_plan(&source, &target, global, log)?;
    if plan.total_files == 0 {
        log.warn("source tree is empty; nothing to do");
        bail!("empty source tree");
    }
    log.debug(&format!(
        "planned {} links ({} source files ignored)",
        plan.links.len(),
        plan.ignored
    ));

    let policy = super::policy(global);
    let entries = reconcile::reconcile(&plan, &policy);

    if global.enforce_integrity {
        let conflicts = reconcile::conflicts(&entries);
        if !conflicts.is_empty() {
            for conflict in &conflicts {
                log.error(&format!("conflict: {conflict}"));
            }
            log.error("Aborting. Nothing was changed.");
            bail!("{} conflicting entries (--enforce-integrity)", conflicts.len());
        }
    }

    let stdin_confirm = StdinConfirm;
    let auto_confirm = AutoConfirm;
    let confirm: &dyn Confirm = if global.yes {
        &auto_confirm
    } else {
        &stdin_confirm
    };

    match apply::apply(&entries, &policy, confirm, log) {
        Ok(outcome) => {
            log.info(&format!(
                "{} created, {} replaced, {} already ok, {} conflicts skipped",
                outcome.created, outcome.replaced, outcome.unchanged, outcome.skipped
            ));
            Ok(())
        }
        Err(ApplyError { applied, error }) => {
            if applied > 0 {
                log.error("Aborting. Partial changes were applied.");
            } else {
                log.error("Aborting. Nothing was changed.");
            }
            Err(error.into())
        }
    }
}
