//! Test: commit succeeds but no default remote is configured

use crate::helpers::*;
use autocommiter::{ChangeEvent, RunOutcome};

/// The commit is kept and the push skipped; this is informational,
/// not an error
#[tokio::test]
async fn test_no_remote_keeps_commit() {
    let (_temp, root) = opted_in_repo();
    let git = MockGit::happy().with(
        "remote",
        MockResponse::fail("error: No such remote 'origin'"),
    );
    let log = git.log();

    let record = run_pipeline(git, &ChangeEvent::modified(root.join("a.txt"))).await;

    assert_eq!(
        record.outcome,
        RunOutcome::Committed {
            message: "update: a.txt".to_string()
        }
    );
    assert!(!record.outcome.is_error());
    assert!(record.outcome.committed());

    // Zero push commands issued
    assert!(subcommands(&log).iter().all(|sub| sub != "push"));
}
