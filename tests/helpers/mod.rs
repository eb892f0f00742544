//! Test utility functions for autocommiter

use async_trait::async_trait;
use autocommiter::git::{CommandResult, GitError, GitExecutor, MARKER_FILE};
use autocommiter::{AutoCommitPipeline, ChangeEvent, RunOutcome, RunRecord};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// One recorded executor invocation
#[derive(Debug, Clone)]
pub struct Invocation {
    pub workdir: PathBuf,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn subcommand(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or("")
    }
}

/// Scripted response for one subcommand invocation
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Exit with the given success flag and output
    Exit {
        success: bool,
        stdout: String,
        stderr: String,
    },
    /// Fail at the executor level with a timeout
    Timeout(u64),
}

impl MockResponse {
    pub fn ok() -> Self {
        MockResponse::Exit {
            success: true,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn ok_with(stdout: &str) -> Self {
        MockResponse::Exit {
            success: true,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub fn fail(stderr: &str) -> Self {
        MockResponse::Exit {
            success: false,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }
}

/// Git executor scripted per subcommand; records every invocation.
///
/// Each subcommand holds a queue of responses consumed one per call;
/// the last response repeats once the queue runs dry.
pub struct MockGit {
    responses: Mutex<HashMap<String, Vec<MockResponse>>>,
    calls: Arc<Mutex<Vec<Invocation>>>,
}

impl MockGit {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A repository with identity and remote configured, a dirty staged
    /// tree, and every git step succeeding
    pub fn happy() -> Self {
        Self::new()
            .with("config", MockResponse::ok_with("dev@example.com\n"))
            .with("add", MockResponse::ok())
            .with("rm", MockResponse::ok())
            // diff --staged --quiet exits non-zero when the tree is dirty
            .with("diff", MockResponse::fail(""))
            .with("commit", MockResponse::ok())
            .with("remote", MockResponse::ok_with("git@example.com:r.git\n"))
            .with("push", MockResponse::ok())
    }

    /// Replace the response script for one subcommand
    pub fn with(self, subcommand: &str, response: MockResponse) -> Self {
        self.with_sequence(subcommand, vec![response])
    }

    /// Script a sequence of responses, consumed one per invocation
    pub fn with_sequence(self, subcommand: &str, responses: Vec<MockResponse>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(subcommand.to_string(), responses);
        self
    }

    /// Shared handle to the invocation log; survives moving the
    /// executor into a pipeline
    pub fn log(&self) -> Arc<Mutex<Vec<Invocation>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl GitExecutor for MockGit {
    async fn run(&self, workdir: &Path, args: &[&str]) -> Result<CommandResult, GitError> {
        self.calls.lock().unwrap().push(Invocation {
            workdir: workdir.to_path_buf(),
            args: args.iter().map(|s| s.to_string()).collect(),
        });

        let sub = args.first().copied().unwrap_or("");
        let response = {
            let mut responses = self.responses.lock().unwrap();
            match responses.get_mut(sub) {
                Some(queue) if queue.len() > 1 => queue.remove(0),
                Some(queue) => queue
                    .first()
                    .cloned()
                    .unwrap_or_else(MockResponse::ok),
                None => MockResponse::ok(),
            }
        };

        match response {
            MockResponse::Exit {
                success,
                stdout,
                stderr,
            } => Ok(CommandResult {
                success,
                exit_code: Some(if success { 0 } else { 1 }),
                stdout,
                stderr,
            }),
            MockResponse::Timeout(secs) => Err(GitError::Timeout(secs)),
        }
    }
}

/// Create a repository root with the opt-in marker present
pub fn opted_in_repo() -> (TempDir, PathBuf) {
    let (temp, root) = repo_without_marker();
    std::fs::write(root.join(MARKER_FILE), "").unwrap();
    (temp, root)
}

/// Create a repository root without the opt-in marker
pub fn repo_without_marker() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("repo");
    std::fs::create_dir_all(root.join(".git")).unwrap();
    (temp, root)
}

/// Run the pipeline once with the given executor
pub async fn run_pipeline(git: MockGit, change: &ChangeEvent) -> RunRecord {
    let pipeline = AutoCommitPipeline::new(git);
    pipeline.run(change).await
}

/// Subcommand names in invocation order
pub fn subcommands(log: &Arc<Mutex<Vec<Invocation>>>) -> Vec<String> {
    log.lock()
        .unwrap()
        .iter()
        .map(|call| call.subcommand().to_string())
        .collect()
}

/// Assert no staging, commit, or push command was ever issued
pub fn assert_no_write_commands(log: &Arc<Mutex<Vec<Invocation>>>) {
    for call in log.lock().unwrap().iter() {
        assert!(
            !matches!(call.subcommand(), "add" | "rm" | "commit" | "push"),
            "Unexpected write command: {:?}",
            call.args
        );
    }
}

/// Assert the outcome is a skip for the given reason
pub fn assert_skipped(record: &RunRecord, reason: autocommiter::SkipReason) {
    match &record.outcome {
        RunOutcome::Skipped { reason: actual } => assert_eq!(*actual, reason),
        other => panic!("Expected Skipped({:?}), got {:?}", reason, other),
    }
}
