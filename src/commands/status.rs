//! The `status` subcommand: a strict dry run.
//!
//! Performs planning and reconciliation, prints the resolved virtual tree
//! and any conflicts, and never calls the executor.

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::logging::Log;
use crate::plan::render::{Mark, RenderEntry, render_tree};
use crate::platform;
use crate::reconcile::{self, Decision, ReconciledLink};

/// Run the status mode.
///
/// # Errors
///
/// Returns an error when the source is invalid, no target can be
/// determined, or integrity enforcement rejects the config.
pub fn run(global: &GlobalOpts, log: &dyn Log) -> Result<()> {
    let source = super::resolve_source(global)?;
    // Unlike linking, status falls back to the home directory so the
    // virtual tree can be previewed without naming a target.
    let target = match &global.target {
        Some(t) => t.clone(),
        None => platform::home_dir()
            .ok_or_else(|| anyhow::anyhow!("no target given and no home directory found"))?,
    };

    let plan = super::build_plan(&source, &target, global, log)?;
    let policy = super::policy(global);
    let entries = reconcile::reconcile(&plan, &policy);

    let render_entries: Vec<RenderEntry> = entries.iter().map(to_render_entry).collect();
    let home = platform::home_dir();
    println!(
        "{}",
        render_tree(&render_entries, &target, home.as_deref())
    );

    for conflict in reconcile::conflicts(&entries) {
        log.warn(&format!("conflict: {conflict}"));
    }
    log.info(&format!(
        "{} links planned, {} source files ignored",
        entries.len(),
        plan.ignored
    ));
    log.info("No changes were made (status is a dry run).");
    Ok(())
}

fn to_render_entry(entry: &ReconciledLink) -> RenderEntry {
    let mark = match &entry.decision {
        Decision::AlreadyCorrect => Mark::Ok,
        Decision::Create => Mark::New,
        Decision::Replace { .. } => Mark::Replace,
        Decision::Refuse(_) => Mark::Conflict,
    };
    RenderEntry {
        target: entry.link.target.clone(),
        mark,
    }
}
