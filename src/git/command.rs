//! Git subprocess executor - runs one command, captures output

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::core::Settings;

/// Error types for executor-level failures.
///
/// Exit-code failures are not errors here; they come back as a
/// `CommandResult` for the pipeline to interpret.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to spawn git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("git timed out after {0} seconds")]
    Timeout(u64),

    #[error("git output exceeded {0} bytes")]
    OutputTooLarge(usize),
}

/// Captured result of one git invocation
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Whether the process exited with code zero
    pub success: bool,

    /// Exit code, when the process was not killed by a signal
    pub exit_code: Option<i32>,

    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,
}

impl CommandResult {
    /// Best diagnostic text for a failed invocation
    pub fn detail(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.exit_code {
            Some(code) => format!("git exited with code {}", code),
            None => "git was killed by a signal".to_string(),
        }
    }
}

/// Trait for running git commands - allows the pipeline to be tested
/// against a scripted executor
#[async_trait]
pub trait GitExecutor: Send + Sync {
    /// Run one git command in `workdir` with discrete argv tokens and
    /// block until it terminates or the timeout elapses
    async fn run(&self, workdir: &Path, args: &[&str]) -> Result<CommandResult, GitError>;
}

/// Executor that spawns the real git binary
#[derive(Debug, Clone)]
pub struct GitRunner {
    /// Path to the git executable
    git_path: String,

    /// Timeout per command in seconds
    timeout_secs: u64,

    /// Bound on each captured output stream in bytes
    max_output_bytes: usize,
}

impl GitRunner {
    pub fn new(git_path: String, timeout_secs: u64, max_output_bytes: usize) -> Self {
        Self {
            git_path,
            timeout_secs,
            max_output_bytes,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.git_path.clone(),
            settings.timeout_secs,
            settings.max_output_bytes,
        )
    }
}

#[async_trait]
impl GitExecutor for GitRunner {
    /// Spawn `git <args>` in `workdir` and capture its output.
    ///
    /// The environment is inherited except that locale variables are
    /// pinned to UTF-8 and interactive prompting is disabled, so no
    /// command can block waiting on a human.
    async fn run(&self, workdir: &Path, args: &[&str]) -> Result<CommandResult, GitError> {
        debug!("Spawning {} {:?} in {}", self.git_path, args, workdir.display());

        let timeout_duration = Duration::from_secs(self.timeout_secs);

        let result = timeout(
            timeout_duration,
            Command::new(&self.git_path)
                .args(args)
                .current_dir(workdir)
                .env("LANG", "en_US.UTF-8")
                .env("LC_ALL", "en_US.UTF-8")
                .env("GIT_TERMINAL_PROMPT", "0")
                .env("GIT_ASKPASS", "true")
                .env_remove("SSH_ASKPASS")
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| GitError::Timeout(self.timeout_secs))?;

        let output = result?;

        if output.stdout.len() > self.max_output_bytes
            || output.stderr.len() > self.max_output_bytes
        {
            return Err(GitError::OutputTooLarge(self.max_output_bytes));
        }

        let result = CommandResult {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        // Diagnostic log entry for every invocation, regardless of outcome
        info!(
            "{} {} (in {}) -> {}",
            self.git_path,
            args.join(" "),
            workdir.display(),
            match result.exit_code {
                Some(code) => format!("exit {}", code),
                None => "killed".to_string(),
            }
        );
        if !result.stdout.trim().is_empty() {
            debug!("stdout: {}", result.stdout.trim());
        }
        if !result.stderr.trim().is_empty() {
            debug!("stderr: {}", result.stderr.trim());
        }

        Ok(result)
    }
}
