//! Plan execution: apply reconciled decisions to the target tree.
//!
//! Entries are applied strictly in plan order. Conflicts are per-entry and
//! never stop sibling actions; a declined confirmation aborts the remaining
//! run, and an I/O failure aborts it too (the target tree state is no
//! longer trustworthy). There is no rollback — links applied before an
//! abort stay in place.

use std::path::Path;

use thiserror::Error;

use crate::error::StowError;
use crate::logging::Log;
use crate::prompt::Confirm;
use crate::reconcile::{Decision, Policy, ReconciledLink};
use crate::resources::symlink::{create_symlink, remove_entry};

/// Per-entry tallies of one execution run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Links newly created.
    pub created: u32,
    /// Existing entries replaced by links.
    pub replaced: u32,
    /// Entries that were already correct.
    pub unchanged: u32,
    /// Entries skipped due to conflicts.
    pub skipped: u32,
}

impl ApplyOutcome {
    /// Number of entries that mutated the target tree.
    #[must_use]
    pub const fn changed(&self) -> u32 {
        self.created + self.replaced
    }
}

/// A failed execution run: what went wrong, plus how much had already been
/// applied (for the "partial changes" diagnostic).
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ApplyError {
    /// Entries that had mutated the target before the failure.
    pub applied: u32,
    /// The underlying failure.
    pub error: StowError,
}

/// Apply reconciled entries in order.
///
/// # Errors
///
/// Returns an [`ApplyError`] when the user declines a confirmation prompt
/// or an I/O operation fails; earlier links remain in place.
pub fn apply(
    entries: &[ReconciledLink],
    policy: &Policy,
    confirm: &dyn Confirm,
    log: &dyn Log,
) -> Result<ApplyOutcome, ApplyError> {
    let mut outcome = ApplyOutcome::default();

    for entry in entries {
        let target = &entry.link.target;
        let source = &entry.link.source;

        match &entry.decision {
            Decision::AlreadyCorrect => {
                outcome.unchanged += 1;
                log.debug(&format!("ok: {} (already linked)", target.display()));
            }
            Decision::Refuse(reason) => {
                outcome.skipped += 1;
                log.warn(&format!("conflict: {}: {reason}", target.display()));
            }
            Decision::Create => {
                make_parents(policy, target, &outcome)?;
                link(source, target, &outcome)?;
                outcome.created += 1;
                log.debug(&format!(
                    "linked {} -> {}",
                    target.display(),
                    source.display()
                ));
            }
            Decision::Replace { prompt } => {
                if *prompt && !policy.auto_yes {
                    let description = format!(
                        "Overwrite {} with a link to {}",
                        target.display(),
                        source.display()
                    );
                    if !confirm.confirm(&description) {
                        return Err(ApplyError {
                            applied: outcome.changed(),
                            error: StowError::Aborted(
                                "confirmation declined; remaining actions skipped".to_string(),
                            ),
                        });
                    }
                }
                make_parents(policy, target, &outcome)?;
                remove_entry(target).map_err(|e| ApplyError {
                    applied: outcome.changed(),
                    error: filesystem_error(target, e),
                })?;
                link(source, target, &outcome)?;
                outcome.replaced += 1;
                log.debug(&format!(
                    "replaced {} -> {}",
                    target.display(),
                    source.display()
                ));
            }
        }
    }

    Ok(outcome)
}

fn make_parents(policy: &Policy, target: &Path, outcome: &ApplyOutcome) -> Result<(), ApplyError> {
    if !policy.make_parents {
        // A missing parent was already downgraded to a conflict during
        // reconciliation; nothing to do here.
        return Ok(());
    }
    if let Some(parent) = target.parent()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| ApplyError {
            applied: outcome.changed(),
            error: StowError::Filesystem {
                path: parent.to_path_buf(),
                source: e,
            },
        })?;
    }
    Ok(())
}

fn link(source: &Path, target: &Path, outcome: &ApplyOutcome) -> Result<(), ApplyError> {
    create_symlink(source, target).map_err(|e| ApplyError {
        applied: outcome.changed(),
        error: filesystem_error(target, e),
    })
}

/// Recover the underlying I/O error from an `anyhow` chain, synthesising
/// one when the chain holds something else.
fn filesystem_error(path: &Path, error: anyhow::Error) -> StowError {
    let source = error
        .downcast::<std::io::Error>()
        .unwrap_or_else(|other| std::io::Error::other(other.to_string()));
    StowError::Filesystem {
        path: path.to_path_buf(),
        source,
    }
}
