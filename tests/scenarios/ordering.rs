//! Test: queued runs never interleave their git commands

use crate::helpers::*;
use autocommiter::{AutoCommitPipeline, ChangeEvent, CommitQueue, RunOutcome};
use async_trait::async_trait;
use autocommiter::git::{CommandResult, GitError, GitExecutor};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Executor that yields between invocations so interleaving would
/// surface if two runs ever overlapped
struct SlowGit {
    log: Arc<Mutex<Vec<Vec<String>>>>,
}

#[async_trait]
impl GitExecutor for SlowGit {
    async fn run(&self, _workdir: &Path, args: &[&str]) -> Result<CommandResult, GitError> {
        self.log
            .lock()
            .unwrap()
            .push(args.iter().map(|s| s.to_string()).collect());
        tokio::time::sleep(Duration::from_millis(2)).await;

        let success = args[0] != "diff";
        Ok(CommandResult {
            success,
            exit_code: Some(if success { 0 } else { 1 }),
            stdout: "ok\n".to_string(),
            stderr: String::new(),
        })
    }
}

/// E1's commands all complete before E2's first command; in particular
/// E1's commit precedes E2's commit
#[tokio::test]
async fn test_fifo_runs_do_not_interleave() {
    let (_temp, root) = opted_in_repo();
    let log = Arc::new(Mutex::new(Vec::new()));
    let git = SlowGit { log: log.clone() };
    let queue = CommitQueue::start(AutoCommitPipeline::new(git));

    let h1 = queue.submit(ChangeEvent::modified(root.join("e1.txt")));
    let h2 = queue.submit(ChangeEvent::modified(root.join("e2.txt")));

    let r1 = h1.record().await.unwrap();
    let r2 = h2.record().await.unwrap();
    assert!(matches!(r1.outcome, RunOutcome::CommittedAndPushed { .. }));
    assert!(matches!(r2.outcome, RunOutcome::CommittedAndPushed { .. }));

    let entries = log.lock().unwrap().clone();
    let per_run = 7; // config, config, add, diff, commit, remote, push
    assert_eq!(entries.len(), per_run * 2);

    // The first run's command block is contiguous
    let e1_add = entries.iter().position(|e| e.contains(&"e1.txt".to_string()));
    let e2_add = entries.iter().position(|e| e.contains(&"e2.txt".to_string()));
    assert!(e1_add.unwrap() < per_run);
    assert!(e2_add.unwrap() >= per_run);

    // Commits land in submission order
    let commits: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e[0] == "commit")
        .map(|(i, _)| i)
        .collect();
    assert_eq!(commits.len(), 2);
    assert!(commits[0] < per_run && commits[1] >= per_run);
}

/// A skipped or failed run releases the queue for later events
#[tokio::test]
async fn test_failure_does_not_block_queue() {
    let (_temp, root) = opted_in_repo();
    let outside = tempfile::TempDir::new().unwrap();
    let loose = outside.path().join("x.txt");
    std::fs::create_dir_all(loose.parent().unwrap()).unwrap();

    let git = MockGit::happy().with_sequence(
        "push",
        vec![
            MockResponse::fail("fatal: remote unreachable"),
            MockResponse::ok(),
        ],
    );
    let queue = CommitQueue::start(AutoCommitPipeline::new(git));

    let h1 = queue.submit(ChangeEvent::modified(&loose));
    let h2 = queue.submit(ChangeEvent::modified(root.join("a.txt")));
    let h3 = queue.submit(ChangeEvent::modified(root.join("b.txt")));

    let r1 = h1.record().await.unwrap();
    assert!(matches!(r1.outcome, RunOutcome::Skipped { .. }));

    let r2 = h2.record().await.unwrap();
    assert!(r2.outcome.is_error());

    // The push failure above stays local to its run
    let r3 = h3.record().await.unwrap();
    assert_eq!(
        r3.outcome,
        RunOutcome::CommittedAndPushed {
            message: "update: b.txt".to_string()
        }
    );
}
