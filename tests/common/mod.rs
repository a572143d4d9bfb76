// Shared helpers for integration tests.
//
// Provides temporary-directory-backed source and target trees with a fluent
// builder so each integration test can set up an isolated environment
// without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rstow::exec::Executor;
use rstow::plan::{Plan, Planner};
use rstow::reconcile::Policy;
use rstow::resolve::predicate::EvalContext;

/// A fixed-answer package oracle for integration tests.
#[derive(Debug, Default)]
pub struct FixedOracle {
    present: Vec<String>,
}

impl FixedOracle {
    /// An oracle that knows the given programs and nothing else.
    pub fn with_programs(programs: &[&str]) -> Self {
        Self {
            present: programs.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Executor for FixedOracle {
    fn which(&self, program: &str) -> bool {
        self.present.iter().any(|p| p == program)
    }
}

/// An isolated pair of source and target trees backed by temp directories.
///
/// Both directories are deleted automatically when dropped.
pub struct TestTree {
    /// Source tree root.
    pub source: tempfile::TempDir,
    /// Target tree root.
    pub target: tempfile::TempDir,
}

impl TestTree {
    /// Create empty source and target trees.
    pub fn new() -> Self {
        Self {
            source: tempfile::tempdir().expect("create source dir"),
            target: tempfile::tempdir().expect("create target dir"),
        }
    }

    /// Path to the source root.
    pub fn source_path(&self) -> &Path {
        self.source.path()
    }

    /// Path to the target root.
    pub fn target_path(&self) -> &Path {
        self.target.path()
    }

    /// Write a source file (creating parents) and return `self`.
    pub fn with_file(self, rel: &str) -> Self {
        let path = self.source.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(&path, format!("content of {rel}")).expect("write source file");
        self
    }

    /// Write a `.stowconfig` in the given source subdirectory.
    pub fn with_config(self, rel_dir: &str, content: &str) -> Self {
        let dir = self.source.path().join(rel_dir);
        std::fs::create_dir_all(&dir).expect("create config dir");
        std::fs::write(dir.join(".stowconfig"), content).expect("write config");
        self
    }

    /// Create a directory in the target tree.
    pub fn with_target_dir(self, rel: &str) -> Self {
        std::fs::create_dir_all(self.target.path().join(rel)).expect("create target dir");
        self
    }

    /// Write a regular file in the target tree.
    pub fn with_target_file(self, rel: &str, content: &str) -> Self {
        let path = self.target.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(&path, content).expect("write target file");
        self
    }

    /// Plan with a default-profile context and no exclusions.
    pub fn plan(&self) -> Plan {
        self.plan_with(&FixedOracle::default(), "default")
    }

    /// Plan with a specific oracle and profile.
    pub fn plan_with(&self, oracle: &dyn Executor, profile: &str) -> Plan {
        let ctx = EvalContext { oracle, profile };
        Planner::new(
            self.source.path(),
            self.target.path(),
            &ctx,
            &[],
            true,
        )
        .plan()
        .expect("planning should succeed")
    }

    /// The absolute source path for a relative entry.
    pub fn source_file(&self, rel: &str) -> PathBuf {
        self.source.path().join(rel)
    }
}

/// A permissive default policy: parents created, prompts auto-accepted,
/// ownership checked against the real invoking user.
pub fn auto_policy() -> Policy {
    Policy {
        auto_yes: true,
        make_parents: true,
        current_uid: rstow::platform::current_uid(),
        ..Policy::default()
    }
}
