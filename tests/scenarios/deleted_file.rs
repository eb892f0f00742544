//! Test: tracked file deleted from the working tree

use crate::helpers::*;
use autocommiter::{ChangeEvent, RunOutcome};

/// A tracked removal stages the deletion; no fallback needed
#[tokio::test]
async fn test_tracked_removal() {
    let (_temp, root) = opted_in_repo();
    let git = MockGit::happy().with("rm", MockResponse::ok_with("rm 'b.txt'\n"));
    let log = git.log();

    let record = run_pipeline(git, &ChangeEvent::deleted(root.join("b.txt"))).await;

    assert_eq!(
        record.outcome,
        RunOutcome::CommittedAndPushed {
            message: "delete: b.txt".to_string()
        }
    );
    assert_eq!(
        subcommands(&log),
        vec!["config", "config", "rm", "diff", "commit", "remote", "push"]
    );
}

/// When the path is already absent from tracking, the deletion is
/// staged directly and the run still completes
#[tokio::test]
async fn test_removal_falls_back_to_add() {
    let (_temp, root) = opted_in_repo();
    let git = MockGit::happy().with(
        "rm",
        MockResponse::fail("fatal: pathspec 'b.txt' did not match any files"),
    );
    let log = git.log();

    let record = run_pipeline(git, &ChangeEvent::deleted(root.join("b.txt"))).await;

    assert_eq!(
        record.outcome,
        RunOutcome::CommittedAndPushed {
            message: "delete: b.txt".to_string()
        }
    );
    assert_eq!(
        subcommands(&log),
        vec!["config", "config", "rm", "add", "diff", "commit", "remote", "push"]
    );
}

/// Both the removal and the fallback failing is still not fatal; the
/// dirty check decides, and a clean tree ends the run quietly
#[tokio::test]
async fn test_double_stage_failure_is_not_fatal() {
    let (_temp, root) = opted_in_repo();
    let git = MockGit::happy()
        .with("rm", MockResponse::fail("did not match"))
        .with("add", MockResponse::fail("did not match"))
        // nothing ended up staged
        .with("diff", MockResponse::ok());

    let record = run_pipeline(git, &ChangeEvent::deleted(root.join("b.txt"))).await;

    assert_skipped(&record, autocommiter::SkipReason::NoChanges);
}

/// Deleted paths are staged relative to the repository root
#[tokio::test]
async fn test_deleted_path_relative_to_root() {
    let (_temp, root) = opted_in_repo();
    let git = MockGit::happy();
    let log = git.log();

    run_pipeline(git, &ChangeEvent::deleted(root.join("docs").join("old.md"))).await;

    let calls = log.lock().unwrap().clone();
    let rm = calls.iter().find(|c| c.subcommand() == "rm").unwrap();
    assert_eq!(rm.args, vec!["rm", "docs/old.md"]);
}
