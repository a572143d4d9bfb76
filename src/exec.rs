//! Host-system command lookup, used as the package-presence oracle.
//!
//! Conditional blocks like `[if-pkg:::tmux fzf]` are decided by whether each
//! subject resolves to an executable on the command-search path. The lookup
//! sits behind the [`Executor`] trait so rule resolution stays pure and
//! testable; production code uses [`SystemExecutor`].

/// Abstraction over host-system queries needed during rule resolution.
pub trait Executor: Send + Sync {
    /// `true` if `program` resolves to an executable on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// Production [`Executor`] backed by the `which` crate.
///
/// Resolution uses the process environment's `PATH` directly; no shell is
/// spawned, interactive or otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Configurable mock oracle for tests: a fixed set of "installed" programs.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockExecutor {
    present: Vec<String>,
}

#[cfg(test)]
impl MockExecutor {
    /// Create a mock that knows the given programs and nothing else.
    pub fn with_programs(programs: &[&str]) -> Self {
        Self {
            present: programs.iter().map(ToString::to_string).collect(),
        }
    }
}

#[cfg(test)]
impl Executor for MockExecutor {
    fn which(&self, program: &str) -> bool {
        self.present.iter().any(|p| p == program)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn system_executor_misses_nonexistent_program() {
        let exec = SystemExecutor;
        assert!(
            !exec.which("this-program-does-not-exist-12345"),
            "non-existent program should not be found"
        );
    }

    #[cfg(unix)]
    #[test]
    fn system_executor_finds_sh() {
        let exec = SystemExecutor;
        assert!(exec.which("sh"), "sh should be found on unix");
    }

    #[test]
    fn mock_executor_answers_from_fixed_set() {
        let exec = MockExecutor::with_programs(&["git", "tmux"]);
        assert!(exec.which("git"));
        assert!(exec.which("tmux"));
        assert!(!exec.which("fzf"));
    }
}
