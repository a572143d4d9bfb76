//! Reconciliation: compare the link plan against live target-filesystem
//! state and decide, per entry, whether to create, skip, or replace.
//!
//! Observation reads the target tree (never the source); the decision
//! itself is a pure function of observed state and policy, so the full
//! decision table is unit-testable without a filesystem.

use std::path::{Path, PathBuf};

use crate::error::{ConflictError, ConflictReason};
use crate::plan::{Plan, PlannedLink};
use crate::resources::symlink::paths_equal;

/// Observed state of a planned destination path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetState {
    /// Nothing exists at the destination.
    Absent,
    /// A symlink already points at the resolved source.
    SymlinkCorrect,
    /// A symlink exists but points elsewhere (payload: where it points).
    SymlinkStale(PathBuf),
    /// A regular file occupies the destination.
    RegularFile,
    /// A real directory occupies the destination.
    Directory,
}

/// A destination observation: state plus ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// What occupies the destination.
    pub state: TargetState,
    /// Owner uid of the existing entry (`None` when absent or on platforms
    /// without unix ownership).
    pub owner_uid: Option<u32>,
}

/// Overwrite policy for one run, assembled from CLI flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct Policy {
    /// `--force`: overwrite regular files and stale symlinks without asking.
    pub force: bool,
    /// `--overwrite-others`: permit touching entries owned by other users.
    pub overwrite_others: bool,
    /// `--yes`: auto-accept every confirmation prompt.
    pub auto_yes: bool,
    /// Create missing parent directories (`false` under `--no-parents`).
    pub make_parents: bool,
    /// The invoking user's uid; entries owned by a different uid are
    /// foreign. `None` disables ownership checks.
    pub current_uid: Option<u32>,
}

/// What the executor should do with one planned link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Create the symlink (destination absent).
    Create,
    /// The destination already points at the source; nothing to do.
    AlreadyCorrect,
    /// Remove the existing entry and link in its place. `prompt` is set
    /// when policy requires interactive confirmation first.
    Replace {
        /// Ask before replacing.
        prompt: bool,
    },
    /// Policy forbids touching the existing entry.
    Refuse(ConflictReason),
}

/// A planned link joined with its observed state and decision.
#[derive(Debug, Clone)]
pub struct ReconciledLink {
    /// The planned link.
    pub link: PlannedLink,
    /// Observed destination state.
    pub state: TargetState,
    /// Whether the existing entry is owned by another user.
    pub foreign: bool,
    /// The resulting decision.
    pub decision: Decision,
}

/// Observe the destination of one planned link.
#[must_use]
pub fn observe(target: &Path, source: &Path) -> Observation {
    let Ok(meta) = std::fs::symlink_metadata(target) else {
        return Observation {
            state: TargetState::Absent,
            owner_uid: None,
        };
    };

    let owner_uid = owner_of(&meta);

    let state = if meta.file_type().is_symlink() {
        match std::fs::read_link(target) {
            Ok(existing) if paths_equal(&existing, source) => TargetState::SymlinkCorrect,
            Ok(existing) => TargetState::SymlinkStale(existing),
            Err(_) => TargetState::SymlinkStale(PathBuf::new()),
        }
    } else if meta.is_dir() {
        TargetState::Directory
    } else {
        TargetState::RegularFile
    };

    Observation { state, owner_uid }
}

#[cfg(unix)]
fn owner_of(meta: &std::fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::MetadataExt as _;
    Some(meta.uid())
}

#[cfg(not(unix))]
fn owner_of(_meta: &std::fs::Metadata) -> Option<u32> {
    None
}

/// The decision table. `foreign_uid` is `Some` when the existing entry is
/// owned by a different user than the invoking one.
#[must_use]
pub fn decide(state: &TargetState, foreign_uid: Option<u32>, policy: &Policy) -> Decision {
    match state {
        TargetState::SymlinkCorrect => Decision::AlreadyCorrect,
        TargetState::Absent => Decision::Create,
        _ => {
            if let Some(uid) = foreign_uid
                && !policy.overwrite_others
            {
                return Decision::Refuse(ConflictReason::ForeignOwned { uid });
            }
            match state {
                TargetState::SymlinkStale(_) => Decision::Replace {
                    prompt: !(policy.force || policy.auto_yes || policy.overwrite_others),
                },
                TargetState::RegularFile => {
                    if policy.force {
                        Decision::Replace { prompt: false }
                    } else if policy.overwrite_others && foreign_uid.is_none() {
                        Decision::Replace { prompt: false }
                    } else {
                        Decision::Refuse(ConflictReason::RegularFile)
                    }
                }
                // Replacing a real directory would destroy a subtree; no
                // flag overrides this.
                _ => Decision::Refuse(ConflictReason::Directory),
            }
        }
    }
}

/// Reconcile a whole plan against the live target tree.
#[must_use]
pub fn reconcile(plan: &Plan, policy: &Policy) -> Vec<ReconciledLink> {
    plan.links
        .iter()
        .map(|link| reconcile_one(link, policy))
        .collect()
}

fn reconcile_one(link: &PlannedLink, policy: &Policy) -> ReconciledLink {
    let observation = observe(&link.target, &link.source);
    let foreign_uid = match (observation.owner_uid, policy.current_uid) {
        (Some(owner), Some(current)) if owner != current => Some(owner),
        _ => None,
    };
    let mut decision = decide(&observation.state, foreign_uid, policy);

    // A mutating decision needs its parent directory; without --make-parents
    // a missing parent downgrades it to a per-entry conflict.
    if !policy.make_parents
        && matches!(decision, Decision::Create | Decision::Replace { .. })
        && !link.target.parent().is_some_and(Path::exists)
    {
        decision = Decision::Refuse(ConflictReason::MissingParent);
    }

    ReconciledLink {
        link: link.clone(),
        state: observation.state,
        foreign: foreign_uid.is_some(),
        decision,
    }
}

/// The conflicts among reconciled entries, in plan order.
#[must_use]
pub fn conflicts(entries: &[ReconciledLink]) -> Vec<ConflictError> {
    entries
        .iter()
        .filter_map(|e| match &e.decision {
            Decision::Refuse(reason) => Some(ConflictError {
                target: e.link.target.clone(),
                reason: *reason,
            }),
            _ => None,
        })
        .collect()
}
