//! Conditional-block predicate evaluation.
//!
//! Evaluation is pure apart from the package lookup, which is delegated to
//! the injected [`Executor`] oracle. Both package predicates are
//! conjunctions: `pkg-present` needs *every* subject on `PATH`, and
//! `pkg-absent` needs *every* subject missing.

use crate::config::BlockKind;
use crate::exec::Executor;

/// Runtime context a predicate is evaluated against.
pub struct EvalContext<'a> {
    /// Package-presence oracle.
    pub oracle: &'a dyn Executor,
    /// Active profile name (`"default"` when unset).
    pub profile: &'a str,
}

impl std::fmt::Debug for EvalContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvalContext")
            .field("oracle", &"<dyn Executor>")
            .field("profile", &self.profile)
            .finish()
    }
}

/// Whether a conditional block's guard holds for the current run.
#[must_use]
pub fn evaluate(kind: BlockKind, subjects: &[String], ctx: &EvalContext<'_>) -> bool {
    match kind {
        BlockKind::PkgPresent => subjects.iter().all(|s| ctx.oracle.which(s)),
        BlockKind::PkgAbsent => subjects.iter().all(|s| !ctx.oracle.which(s)),
        BlockKind::ProfileIs => subjects.iter().any(|s| s == ctx.profile),
        BlockKind::ProfileIsNot => !subjects.iter().any(|s| s == ctx.profile),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::exec::MockExecutor;

    fn subjects(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn pkg_present_is_a_conjunction() {
        let oracle = MockExecutor::with_programs(&["a"]);
        let ctx = EvalContext {
            oracle: &oracle,
            profile: "default",
        };
        assert!(evaluate(BlockKind::PkgPresent, &subjects(&["a"]), &ctx));
        assert!(
            !evaluate(BlockKind::PkgPresent, &subjects(&["a", "b"]), &ctx),
            "one absent subject must fail the conjunction"
        );
    }

    #[test]
    fn pkg_absent_requires_every_subject_missing() {
        let oracle = MockExecutor::with_programs(&["a"]);
        let ctx = EvalContext {
            oracle: &oracle,
            profile: "default",
        };
        assert!(evaluate(BlockKind::PkgAbsent, &subjects(&["b", "c"]), &ctx));
        assert!(
            !evaluate(BlockKind::PkgAbsent, &subjects(&["a", "b"]), &ctx),
            "a present subject must fail pkg-absent even when another is missing"
        );
    }

    #[test]
    fn profile_is_checks_membership() {
        let oracle = MockExecutor::default();
        let ctx = EvalContext {
            oracle: &oracle,
            profile: "work",
        };
        assert!(evaluate(
            BlockKind::ProfileIs,
            &subjects(&["home", "work"]),
            &ctx
        ));
        assert!(!evaluate(BlockKind::ProfileIs, &subjects(&["home"]), &ctx));
    }

    #[test]
    fn profile_is_not_is_the_complement() {
        let oracle = MockExecutor::default();
        let ctx = EvalContext {
            oracle: &oracle,
            profile: "work",
        };
        assert!(!evaluate(
            BlockKind::ProfileIsNot,
            &subjects(&["work"]),
            &ctx
        ));
        assert!(evaluate(BlockKind::ProfileIsNot, &subjects(&["home"]), &ctx));
    }

    #[test]
    fn empty_subjects_degenerate_cases() {
        let oracle = MockExecutor::default();
        let ctx = EvalContext {
            oracle: &oracle,
            profile: "default",
        };
        // Vacuous truth for the conjunctions; the parser diagnoses empty
        // subject lists before they reach evaluation.
        assert!(evaluate(BlockKind::PkgPresent, &[], &ctx));
        assert!(evaluate(BlockKind::PkgAbsent, &[], &ctx));
        assert!(!evaluate(BlockKind::ProfileIs, &[], &ctx));
        assert!(evaluate(BlockKind::ProfileIsNot, &[], &ctx));
    }
}
