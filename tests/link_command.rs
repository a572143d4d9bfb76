//! End-to-end tests for the linking flow: plan → reconcile → apply.
#![cfg(unix)]

mod common;

use common::{FixedOracle, TestTree, auto_policy};
use rstow::apply::apply;
use rstow::error::ConflictReason;
use rstow::prompt::AutoConfirm;
use rstow::reconcile::{Decision, Policy, conflicts, reconcile};

/// Minimal in-memory log for integration tests.
#[derive(Debug, Default)]
struct NullLog;

impl rstow::logging::Log for NullLog {
    fn error(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
    fn info(&self, _msg: &str) {}
    fn debug(&self, _msg: &str) {}
    fn dry_run(&self, _msg: &str) {}
}

fn run(tree: &TestTree, policy: &Policy) -> rstow::apply::ApplyOutcome {
    let plan = tree.plan();
    let entries = reconcile(&plan, policy);
    apply(&entries, policy, &AutoConfirm, &NullLog).expect("apply should succeed")
}

#[test]
fn links_full_tree_preserving_layout() {
    let tree = TestTree::new()
        .with_file(".bashrc")
        .with_file(".config/nvim/init.lua")
        .with_file(".config/alacritty/alacritty.yml");

    let outcome = run(&tree, &auto_policy());
    assert_eq!(outcome.created, 3);

    for rel in [
        ".bashrc",
        ".config/nvim/init.lua",
        ".config/alacritty/alacritty.yml",
    ] {
        let link = tree.target_path().join(rel);
        assert_eq!(
            std::fs::read_link(&link).expect("link exists"),
            tree.source_file(rel)
        );
    }
}

#[test]
fn ignored_directories_are_never_created_in_target() {
    let tree = TestTree::new()
        .with_file("keep/file.txt")
        .with_file(".git/objects/ab")
        .with_config("", ".git/\n");

    let outcome = run(&tree, &auto_policy());
    assert_eq!(outcome.created, 1);
    assert!(tree.target_path().join("keep/file.txt").is_symlink());
    assert!(
        !tree.target_path().join(".git").exists(),
        "fully ignored directories must not appear in the target"
    );
}

#[test]
fn unignore_surfaces_single_file_from_ignored_directory() {
    let tree = TestTree::new()
        .with_file("scripts/.bashrc")
        .with_file("scripts/.vimrc")
        .with_file("scripts/other.sh")
        .with_config("", "scripts/\n!!scripts/.bashrc\n");

    let outcome = run(&tree, &auto_policy());
    assert_eq!(outcome.created, 1);
    assert!(tree.target_path().join("scripts/.bashrc").is_symlink());
    assert!(!tree.target_path().join("scripts/.vimrc").exists());
    assert!(!tree.target_path().join("scripts/other.sh").exists());
}

#[test]
fn redirect_places_file_outside_source_relative_position() {
    let tree = TestTree::new()
        .with_file("scripts/.bashrc")
        .with_config("", "[redirect]\nscripts/.bashrc ::: .\n");

    let outcome = run(&tree, &auto_policy());
    assert_eq!(outcome.created, 1);
    assert_eq!(
        std::fs::read_link(tree.target_path().join(".bashrc")).expect("redirected link"),
        tree.source_file("scripts/.bashrc")
    );
    assert!(
        !tree.target_path().join("scripts").exists(),
        "the source-relative position must not be populated"
    );
}

#[test]
fn glob_redirect_fans_out_to_every_matching_directory() {
    let tree = TestTree::new()
        .with_file("manpages/intro.7")
        .with_config("", "[redirect]\nmanpages/intro.7 ::: share/man*\n")
        .with_target_dir("share/man1")
        .with_target_dir("share/man7")
        .with_target_dir("share/not-matching");

    let outcome = run(&tree, &auto_policy());
    assert_eq!(outcome.created, 2, "one link per matching directory");
    for dir in ["share/man1", "share/man7"] {
        assert_eq!(
            std::fs::read_link(tree.target_path().join(dir).join("intro.7"))
                .expect("fanned-out link"),
            tree.source_file("manpages/intro.7")
        );
    }
}

#[test]
fn zero_match_glob_redirect_drops_file_without_error() {
    let tree = TestTree::new()
        .with_file(".bashrc")
        .with_config("", "[redirect]\n.bashrc ::: nonexistent-*\n");

    let plan = tree.plan();
    assert!(plan.links.is_empty());
    assert_eq!(plan.warnings.len(), 1);

    let outcome = run(&tree, &auto_policy());
    assert_eq!(outcome.created, 0);
    assert!(
        std::fs::read_dir(tree.target_path())
            .expect("read target")
            .next()
            .is_none(),
        "a zero-match glob must not create directories"
    );
}

#[test]
fn second_run_is_fully_idempotent() {
    let tree = TestTree::new()
        .with_file(".bashrc")
        .with_file(".config/app/settings.toml");

    let first = run(&tree, &auto_policy());
    assert_eq!(first.created, 2);

    // Reconciling an already-populated target yields no conflicts and no
    // further changes.
    let plan = tree.plan();
    let entries = reconcile(&plan, &auto_policy());
    assert!(conflicts(&entries).is_empty());
    assert!(
        entries
            .iter()
            .all(|e| e.decision == Decision::AlreadyCorrect),
        "every entry must classify as already correct"
    );

    let second = run(&tree, &auto_policy());
    assert_eq!(second.changed(), 0);
    assert_eq!(second.unchanged, 2);
}

#[test]
fn regular_file_conflict_is_skipped_and_preserved() {
    let tree = TestTree::new()
        .with_file(".bashrc")
        .with_file(".profile")
        .with_target_file(".bashrc", "precious data");

    let policy = auto_policy();
    let plan = tree.plan();
    let entries = reconcile(&plan, &policy);

    let found = conflicts(&entries);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].reason, ConflictReason::RegularFile);

    let outcome = apply(&entries, &policy, &AutoConfirm, &NullLog).expect("apply");
    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.created, 1);
    assert_eq!(
        std::fs::read_to_string(tree.target_path().join(".bashrc")).expect("read"),
        "precious data",
        "the conflicting file must survive untouched"
    );
}

#[test]
fn force_replaces_regular_files_and_stale_symlinks() {
    let tree = TestTree::new()
        .with_file(".bashrc")
        .with_file(".vimrc")
        .with_target_file(".bashrc", "old data");
    std::os::unix::fs::symlink(
        tree.target_path().join("somewhere-else"),
        tree.target_path().join(".vimrc"),
    )
    .expect("create stale symlink");

    let policy = Policy {
        force: true,
        ..auto_policy()
    };
    let outcome = run(&tree, &policy);
    assert_eq!(outcome.replaced, 2);
    assert_eq!(
        std::fs::read_link(tree.target_path().join(".bashrc")).expect("link"),
        tree.source_file(".bashrc")
    );
}

#[test]
fn pkg_conditional_blocks_follow_the_oracle() {
    let tree = TestTree::new()
        .with_file("tmux.conf")
        .with_file("fzf.zsh")
        .with_config(
            "",
            "[if-not-pkg:::tmux]\ntmux.conf\n[end]\n[if-not-pkg:::fzf]\nfzf.zsh\n[end]\n",
        );

    // tmux installed, fzf missing: tmux.conf survives (its if-not-pkg block
    // is false), fzf.zsh is ignored.
    let oracle = FixedOracle::with_programs(&["tmux"]);
    let plan = tree.plan_with(&oracle, "default");
    let rels: Vec<_> = plan.links.iter().map(|l| l.rel.clone()).collect();
    assert_eq!(rels, vec![std::path::PathBuf::from("tmux.conf")]);
}

#[test]
fn profile_conditional_blocks_follow_the_active_profile() {
    let tree = TestTree::new()
        .with_file("work-only.conf")
        .with_config("", "[if-not-profile:::work]\nwork-only.conf\n[end]\n");

    let oracle = FixedOracle::default();
    let work = tree.plan_with(&oracle, "work");
    assert_eq!(work.links.len(), 1, "active profile skips the ignore block");

    let home = tree.plan_with(&oracle, "home");
    assert!(home.links.is_empty(), "other profiles keep the ignore");
}

#[test]
fn nested_configs_override_only_their_subtree() {
    let tree = TestTree::new()
        .with_file("top.md")
        .with_file("docs/README.md")
        .with_config("", "**/*.md\n")
        .with_config("docs", "!!README.md\n");

    let outcome = run(&tree, &auto_policy());
    assert_eq!(outcome.created, 1);
    assert!(tree.target_path().join("docs/README.md").is_symlink());
    assert!(
        !tree.target_path().join("top.md").exists(),
        "the nested un-ignore must not leak to the parent directory"
    );
}

#[test]
fn plan_is_deterministic_across_runs() {
    let tree = TestTree::new()
        .with_file("zz.txt")
        .with_file("aa.txt")
        .with_file("mm/nested.txt");

    let first: Vec<_> = tree.plan().links.into_iter().map(|l| l.target).collect();
    let second: Vec<_> = tree.plan().links.into_iter().map(|l| l.target).collect();
    assert_eq!(first, second);
    let mut sorted = first.clone();
    sorted.sort();
    assert_eq!(first, sorted, "walk order is lexicographic");
}
