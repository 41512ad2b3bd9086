//! E2E parity tests for stderr output — Phase 5.
//!
//! Verifies that stderr messages match between git and minigit for
//! deterministic error cases, conflict reports, and status messages.

mod common;

use common::*;

// ══════════════════════════════════════════════════════════════════════════════
// Error message parity (deterministic stderr)
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_stderr_checkout_nonexistent_branch() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_linear_history(dir_git.path(), 2);
    setup_linear_history(dir_minigit.path(), 2);
    let g = git(dir_git.path(), &["checkout", "nonexistent"]);
    let m = minigit(dir_minigit.path(), &["checkout", "nonexistent"]);
    assert_exit_code_eq(&g, &m);
    assert_stderr_matches(&g, &m);
}

#[test]
#[ignore] // known parity gap
fn test_stderr_switch_nonexistent_branch() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_linear_history(dir_git.path(), 2);
    setup_linear_history(dir_minigit.path(), 2);
    let g = git(dir_git.path(), &["switch", "nonexistent"]);
    let m = minigit(dir_minigit.path(), &["switch", "nonexistent"]);
    assert_exit_code_eq(&g, &m);
    assert_stderr_matches(&g, &m);
}

#[test]
#[ignore] // known parity gap
fn test_stderr_branch_delete_current() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_linear_history(dir_git.path(), 2);
    setup_linear_history(dir_minigit.path(), 2);
    let g = git(dir_git.path(), &["branch", "-d", "main"]);
    let m = minigit(dir_minigit.path(), &["branch", "-d", "main"]);
    assert_exit_code_eq(&g, &m);
    assert_stderr_matches(&g, &m);
}

#[test]
#[ignore] // known parity gap
fn test_stderr_tag_delete_nonexistent() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_linear_history(dir_git.path(), 1);
    setup_linear_history(dir_minigit.path(), 1);
    let g = git(dir_git.path(), &["tag", "-d", "nonexistent"]);
    let m = minigit(dir_minigit.path(), &["tag", "-d", "nonexistent"]);
    assert_exit_code_eq(&g, &m);
    assert_stderr_matches(&g, &m);
}

#[test]
#[ignore] // known parity gap
fn test_stderr_reset_invalid_ref() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_linear_history(dir_git.path(), 2);
    setup_linear_history(dir_minigit.path(), 2);
    let g = git(dir_git.path(), &["reset", "nonexistent"]);
    let m = minigit(dir_minigit.path(), &["reset", "nonexistent"]);
    assert_exit_code_eq(&g, &m);
    assert_stderr_matches(&g, &m);
}

#[test]
#[ignore] // known parity gap
fn test_stderr_cherry_pick_invalid() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_linear_history(dir_git.path(), 2);
    setup_linear_history(dir_minigit.path(), 2);
    let g = git(dir_git.path(), &["cherry-pick", "nonexistent"]);
    let m = minigit(dir_minigit.path(), &["cherry-pick", "nonexistent"]);
    assert_exit_code_eq(&g, &m);
    assert_stderr_matches(&g, &m);
}

#[test]
#[ignore] // known parity gap
fn test_stderr_revert_invalid() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_linear_history(dir_git.path(), 2);
    setup_linear_history(dir_minigit.path(), 2);
    let g = git(dir_git.path(), &["revert", "nonexistent"]);
    let m = minigit(dir_minigit.path(), &["revert", "nonexistent"]);
    assert_exit_code_eq(&g, &m);
    assert_stderr_matches(&g, &m);
}

// ══════════════════════════════════════════════════════════════════════════════
// Merge conflict stderr
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_stderr_merge_conflict() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_merge_conflict(dir_git.path());
    setup_merge_conflict(dir_minigit.path());
    let g = git(dir_git.path(), &["merge", "feature"]);
    let m = minigit(dir_minigit.path(), &["merge", "feature"]);
    assert_exit_code_eq(&g, &m);
    // Conflict messages should mention the conflicting file
    assert!(g.stdout.contains("conflict") || g.stderr.contains("conflict") ||
            g.stdout.contains("Conflict") || g.stderr.contains("CONFLICT"),
            "git should report conflict");
}

#[test]
fn test_stderr_cherry_pick_conflict() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_merge_conflict(dir_git.path());
    setup_merge_conflict(dir_minigit.path());
    let g = git(dir_git.path(), &["cherry-pick", "feature"]);
    let m = minigit(dir_minigit.path(), &["cherry-pick", "feature"]);
    assert_exit_code_eq(&g, &m);
}

// ══════════════════════════════════════════════════════════════════════════════
// Command status messages
// ══════════════════════════════════════════════════════════════════════════════

#[test]
#[ignore] // known parity gap
fn test_stderr_commit_nothing() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_linear_history(dir_git.path(), 2);
    setup_linear_history(dir_minigit.path(), 2);
    let g = git(dir_git.path(), &["commit", "-m", "nothing"]);
    let m = minigit(dir_minigit.path(), &["commit", "-m", "nothing"]);
    assert_exit_code_eq(&g, &m);
    // Both should mention "nothing to commit" or similar
}

#[test]
#[ignore] // known parity gap
fn test_stderr_clean_no_force() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_untracked_files(dir_git.path());
    setup_untracked_files(dir_minigit.path());
    let g = git(dir_git.path(), &["clean"]);
    let m = minigit(dir_minigit.path(), &["clean"]);
    assert_exit_code_eq(&g, &m);
    assert_stderr_matches(&g, &m);
}

// ══════════════════════════════════════════════════════════════════════════════
// Not-a-repo stderr
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_stderr_not_a_repo() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    let g = git(dir_git.path(), &["status"]);
    let m = minigit(dir_minigit.path(), &["status"]);
    assert_exit_code_eq(&g, &m);
    // Both should have "fatal" in stderr about not being a git repo
    assert!(g.stderr.contains("fatal") || g.stderr.contains("not a git repository"),
            "git stderr should mention fatal/not a git repo: {}", g.stderr);
    assert!(m.stderr.contains("fatal") || m.stderr.contains("not a git repository"),
            "minigit stderr should mention fatal/not a git repo: {}", m.stderr);
}

// ══════════════════════════════════════════════════════════════════════════════
// Stash stderr
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_stderr_stash_nothing() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_linear_history(dir_git.path(), 2);
    setup_linear_history(dir_minigit.path(), 2);
    // No dirty changes to stash
    let g = git(dir_git.path(), &["stash"]);
    let m = minigit(dir_minigit.path(), &["stash"]);
    assert_exit_code_eq(&g, &m);
}

#[test]
#[ignore] // known parity gap
fn test_stderr_stash_pop_empty() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_linear_history(dir_git.path(), 2);
    setup_linear_history(dir_minigit.path(), 2);
    let g = git(dir_git.path(), &["stash", "pop"]);
    let m = minigit(dir_minigit.path(), &["stash", "pop"]);
    assert_exit_code_eq(&g, &m);
    assert_stderr_matches(&g, &m);
}

// ══════════════════════════════════════════════════════════════════════════════
// Abort state errors stderr
// ══════════════════════════════════════════════════════════════════════════════

#[test]
#[ignore] // known parity gap
fn test_stderr_merge_abort_no_merge() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_linear_history(dir_git.path(), 2);
    setup_linear_history(dir_minigit.path(), 2);
    let g = git(dir_git.path(), &["merge", "--abort"]);
    let m = minigit(dir_minigit.path(), &["merge", "--abort"]);
    assert_exit_code_eq(&g, &m);
    assert_stderr_matches(&g, &m);
}

#[test]
#[ignore] // known parity gap
fn test_stderr_rebase_abort_no_rebase() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_linear_history(dir_git.path(), 2);
    setup_linear_history(dir_minigit.path(), 2);
    let g = git(dir_git.path(), &["rebase", "--abort"]);
    let m = minigit(dir_minigit.path(), &["rebase", "--abort"]);
    assert_exit_code_eq(&g, &m);
    assert_stderr_matches(&g, &m);
}

// ══════════════════════════════════════════════════════════════════════════════
// Full parity checks (exit code + stdout + stderr)
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_full_parity_log() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_linear_history(dir_git.path(), 5);
    setup_linear_history(dir_minigit.path(), 5);
    let g = git(dir_git.path(), &["log", "--oneline"]);
    let m = minigit(dir_minigit.path(), &["log", "--oneline"]);
    assert_full_parity(&g, &m);
}

#[test]
fn test_full_parity_diff() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_linear_history(dir_git.path(), 2);
    setup_linear_history(dir_minigit.path(), 2);
    let g = git(dir_git.path(), &["diff", "HEAD~1", "HEAD"]);
    let m = minigit(dir_minigit.path(), &["diff", "HEAD~1", "HEAD"]);
    assert_full_parity(&g, &m);
}

#[test]
fn test_full_parity_status() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_linear_history(dir_git.path(), 2);
    setup_linear_history(dir_minigit.path(), 2);
    let g = git(dir_git.path(), &["status", "--porcelain"]);
    let m = minigit(dir_minigit.path(), &["status", "--porcelain"]);
    assert_full_parity(&g, &m);
}

#[test]
fn test_full_parity_branch_list() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_branched_history(dir_git.path());
    setup_branched_history(dir_minigit.path());
    let g = git(dir_git.path(), &["branch", "--list"]);
    let m = minigit(dir_minigit.path(), &["branch", "--list"]);
    assert_full_parity(&g, &m);
}

#[test]
fn test_full_parity_tag_list() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_tag_scenarios(dir_git.path());
    setup_tag_scenarios(dir_minigit.path());
    let g = git(dir_git.path(), &["tag", "-l"]);
    let m = minigit(dir_minigit.path(), &["tag", "-l"]);
    assert_full_parity(&g, &m);
}

#[test]
fn test_full_parity_rev_parse() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_linear_history(dir_git.path(), 3);
    setup_linear_history(dir_minigit.path(), 3);
    let g = git(dir_git.path(), &["rev-parse", "HEAD"]);
    let m = minigit(dir_minigit.path(), &["rev-parse", "HEAD"]);
    assert_full_parity(&g, &m);
}

#[test]
fn test_full_parity_show() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_linear_history(dir_git.path(), 2);
    setup_linear_history(dir_minigit.path(), 2);
    let g = git(dir_git.path(), &["show", "--stat"]);
    let m = minigit(dir_minigit.path(), &["show", "--stat"]);
    assert_full_parity(&g, &m);
}

#[test]
fn test_full_parity_blame() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_linear_history(dir_git.path(), 2);
    setup_linear_history(dir_minigit.path(), 2);
    let g = git(dir_git.path(), &["blame", "file_0.txt"]);
    let m = minigit(dir_minigit.path(), &["blame", "file_0.txt"]);
    assert_full_parity(&g, &m);
}

#[test]
fn test_full_parity_shortlog() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_linear_history(dir_git.path(), 5);
    setup_linear_history(dir_minigit.path(), 5);
    let g = git(dir_git.path(), &["shortlog", "-s"]);
    let m = minigit(dir_minigit.path(), &["shortlog", "-s"]);
    assert_full_parity(&g, &m);
}

#[test]
fn test_full_parity_ls_files() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_linear_history(dir_git.path(), 3);
    setup_linear_history(dir_minigit.path(), 3);
    let g = git(dir_git.path(), &["ls-files"]);
    let m = minigit(dir_minigit.path(), &["ls-files"]);
    assert_full_parity(&g, &m);
}

#[test]
fn test_full_parity_cat_file() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_linear_history(dir_git.path(), 1);
    setup_linear_history(dir_minigit.path(), 1);
    let g = git(dir_git.path(), &["cat-file", "-t", "HEAD"]);
    let m = minigit(dir_minigit.path(), &["cat-file", "-t", "HEAD"]);
    assert_full_parity(&g, &m);
}

#[test]
fn test_full_parity_for_each_ref() {
    let dir_git = tempfile::tempdir().unwrap();
    let dir_minigit = tempfile::tempdir().unwrap();
    setup_branched_history(dir_git.path());
    setup_branched_history(dir_minigit.path());
    let g = git(dir_git.path(), &["for-each-ref", "--format=%(refname)"]);
    let m = minigit(dir_minigit.path(), &["for-each-ref", "--format=%(refname)"]);
    assert_full_parity(&g, &m);
}
