//! Pipeline execution: the auto-commit state machine and its queue

pub mod pipeline;
pub mod queue;

pub use pipeline::{AutoCommitPipeline, EventHandler, PipelineEvent};
pub use queue::{CommitQueue, RunHandle};
