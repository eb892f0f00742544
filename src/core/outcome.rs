//! Terminal outcomes of pipeline runs

use crate::core::ChangeEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a run ended without creating a commit
///
/// These are expected, non-error outcomes that require no user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// No ancestor of the changed path is a git repository
    NoRepository,
    /// The repository has no `.autocommiter` marker file
    NotOptedIn,
    /// Staging produced no difference against the last commit
    NoChanges,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NoRepository => "no-repository",
            SkipReason::NotOptedIn => "not-opted-in",
            SkipReason::NoChanges => "no-changes",
        }
    }
}

/// Which pipeline step a run failed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    /// `git config user.name` / `user.email` missing
    Identity,
    /// Staging or the staged-diff check failed
    Stage,
    /// `git commit` failed
    Commit,
    /// `git push` failed; the local commit is kept
    Push,
}

impl FailureStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureStage::Identity => "missing-identity",
            FailureStage::Stage => "stage-error",
            FailureStage::Commit => "commit-error",
            FailureStage::Push => "push-error",
        }
    }
}

/// The single final state of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum RunOutcome {
    /// Nothing to do; see the reason
    Skipped { reason: SkipReason },
    /// Commit created but no default remote is configured, push skipped
    Committed { message: String },
    /// Commit created and pushed to the default remote
    CommittedAndPushed { message: String },
    /// A step failed; for `Push` the local commit is retained
    Failed { stage: FailureStage, detail: String },
}

impl RunOutcome {
    /// Whether this outcome is surfaced as an error notification
    pub fn is_error(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }

    /// Whether a commit exists after this run
    pub fn committed(&self) -> bool {
        matches!(
            self,
            RunOutcome::Committed { .. }
                | RunOutcome::CommittedAndPushed { .. }
                | RunOutcome::Failed {
                    stage: FailureStage::Push,
                    ..
                }
        )
    }
}

/// Record of one pipeline run, from admission to terminal outcome
///
/// A run never outlives its record; no retry state is carried forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Unique run ID
    pub run_id: Uuid,

    /// The change event this run consumed
    pub change: ChangeEvent,

    /// Terminal outcome
    pub outcome: RunOutcome,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run reached its terminal outcome
    pub finished_at: DateTime<Utc>,
}
