//! Auto-commit pipeline - turns one change event into a terminal outcome

use crate::{
    core::{ChangeEvent, ChangeKind, FailureStage, RunOutcome, RunRecord, SkipReason},
    git::{GitExecutor, RepositoryRoot},
};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Events emitted while a run progresses, for UI consumption.
/// Diagnostics go to the log independently; the two are never conflated.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    RunStarted {
        run_id: Uuid,
        change: ChangeEvent,
    },
    /// The push step began; UI may show a progress indicator spanning
    /// exactly this step
    PushStarted {
        run_id: Uuid,
        root: PathBuf,
    },
    RunFinished {
        record: RunRecord,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(PipelineEvent) + Send + Sync>;

/// The auto-commit state machine.
///
/// One `run` call consumes one change event and drives
/// locate → opt-in → identity → stage → dirty-check → commit →
/// remote-check → push, with an explicit early exit at every step.
/// Nothing here blocks except the executor invocations.
pub struct AutoCommitPipeline<G> {
    git: G,
    event_handlers: Vec<EventHandler>,
}

impl<G: GitExecutor> AutoCommitPipeline<G> {
    pub fn new(git: G) -> Self {
        Self {
            git,
            event_handlers: Vec::new(),
        }
    }

    /// Register a handler for pipeline events
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(PipelineEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    fn emit(&self, event: PipelineEvent) {
        for handler in &self.event_handlers {
            handler(event.clone());
        }
    }

    /// Run the pipeline for one change event and return its record.
    ///
    /// Never panics and never returns early without a terminal outcome;
    /// failures stay local to this run.
    pub async fn run(&self, change: &ChangeEvent) -> RunRecord {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        info!(
            "Run {} started: {} {}",
            run_id,
            change.kind.verb(),
            change.path.display()
        );
        self.emit(PipelineEvent::RunStarted {
            run_id,
            change: change.clone(),
        });

        let outcome = self.execute(run_id, change).await;

        match &outcome {
            RunOutcome::Skipped { reason } => {
                info!("Run {} skipped ({})", run_id, reason.as_str())
            }
            RunOutcome::Committed { message } => {
                info!("Run {} committed without push: {}", run_id, message)
            }
            RunOutcome::CommittedAndPushed { message } => {
                info!("Run {} committed and pushed: {}", run_id, message)
            }
            RunOutcome::Failed { stage, detail } => {
                error!("Run {} failed ({}): {}", run_id, stage.as_str(), detail)
            }
        }

        let record = RunRecord {
            run_id,
            change: change.clone(),
            outcome,
            started_at,
            finished_at: Utc::now(),
        };
        self.emit(PipelineEvent::RunFinished {
            record: record.clone(),
        });
        record
    }

    async fn execute(&self, run_id: Uuid, change: &ChangeEvent) -> RunOutcome {
        // LocateRoot
        let Some(root) = RepositoryRoot::locate(&change.path) else {
            return RunOutcome::Skipped {
                reason: SkipReason::NoRepository,
            };
        };

        // CheckOptIn - fresh existence check, never cached
        if !root.is_opted_in() {
            return RunOutcome::Skipped {
                reason: SkipReason::NotOptedIn,
            };
        }

        // CheckIdentity - nothing is staged until both keys resolve
        for key in ["user.name", "user.email"] {
            match self.git.run(root.path(), &["config", key]).await {
                Ok(r) if r.success && !r.stdout.trim().is_empty() => {}
                Ok(_) => {
                    return RunOutcome::Failed {
                        stage: FailureStage::Identity,
                        detail: format!(
                            "git {} is not configured; set it with `git config {} <value>`",
                            key, key
                        ),
                    };
                }
                Err(e) => {
                    return RunOutcome::Failed {
                        stage: FailureStage::Identity,
                        detail: e.to_string(),
                    };
                }
            }
        }

        // Stage - paths relative to the root, robust to root renames
        let rel = root.relativize(&change.path).to_string_lossy().into_owned();
        match change.kind {
            ChangeKind::Modified => match self.git.run(root.path(), &["add", &rel]).await {
                Ok(r) if r.success => {}
                Ok(r) => {
                    return RunOutcome::Failed {
                        stage: FailureStage::Stage,
                        detail: r.detail(),
                    };
                }
                Err(e) => {
                    return RunOutcome::Failed {
                        stage: FailureStage::Stage,
                        detail: e.to_string(),
                    };
                }
            },
            ChangeKind::Deleted => {
                // Tracked removal first; stage the deletion directly if
                // the path is already absent from tracking. Neither
                // failure is fatal - the dirty check decides.
                let removed = matches!(
                    self.git.run(root.path(), &["rm", &rel]).await,
                    Ok(r) if r.success
                );
                if !removed {
                    debug!("Run {}: git rm failed, staging deletion of {}", run_id, rel);
                    match self.git.run(root.path(), &["add", &rel]).await {
                        Ok(r) if r.success => {}
                        Ok(r) => debug!("Run {}: fallback add failed: {}", run_id, r.detail()),
                        Err(e) => warn!("Run {}: fallback add errored: {}", run_id, e),
                    }
                }
            }
        }

        // CheckDirty - exit 0 means the staged tree matches the last
        // commit; this is the one place an exit code drives control flow
        match self
            .git
            .run(root.path(), &["diff", "--staged", "--quiet"])
            .await
        {
            Ok(r) if r.success => {
                return RunOutcome::Skipped {
                    reason: SkipReason::NoChanges,
                };
            }
            Ok(_) => {}
            Err(e) => {
                return RunOutcome::Failed {
                    stage: FailureStage::Stage,
                    detail: e.to_string(),
                };
            }
        }

        // Commit - the message is one argv token, spaces preserved
        let message = change.commit_message();
        match self
            .git
            .run(root.path(), &["commit", "-m", &message])
            .await
        {
            Ok(r) if r.success => {}
            Ok(r) => {
                return RunOutcome::Failed {
                    stage: FailureStage::Commit,
                    detail: r.detail(),
                };
            }
            Err(e) => {
                return RunOutcome::Failed {
                    stage: FailureStage::Commit,
                    detail: e.to_string(),
                };
            }
        }

        // CheckRemote - absent remote keeps the commit and skips the push
        match self
            .git
            .run(root.path(), &["remote", "get-url", "origin"])
            .await
        {
            Ok(r) if r.success => {}
            Ok(_) => {
                return RunOutcome::Committed { message };
            }
            Err(e) => {
                return RunOutcome::Failed {
                    stage: FailureStage::Push,
                    detail: e.to_string(),
                };
            }
        }

        // Push - failure keeps the local commit, never rolled back
        self.emit(PipelineEvent::PushStarted {
            run_id,
            root: root.path().to_path_buf(),
        });
        match self.git.run(root.path(), &["push"]).await {
            Ok(r) if r.success => RunOutcome::CommittedAndPushed { message },
            Ok(r) => RunOutcome::Failed {
                stage: FailureStage::Push,
                detail: r.detail(),
            },
            Err(e) => RunOutcome::Failed {
                stage: FailureStage::Push,
                detail: e.to_string(),
            },
        }
    }
}
