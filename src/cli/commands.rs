//! CLI command definitions

use clap::Args;

/// Watch directories and auto-commit saved changes
#[derive(Debug, Args, Clone)]
pub struct WatchCommand {
    /// Directory to watch (repeatable; defaults to the current directory)
    #[arg(short, long = "path", default_value = ".")]
    pub path: Vec<String>,
}

/// Process a single change event and exit
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path of the changed file
    #[arg(short, long)]
    pub file: String,

    /// Treat the change as a deletion
    #[arg(long)]
    pub deleted: bool,

    /// Output the run record in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Turn automation on
#[derive(Debug, Args, Clone)]
pub struct EnableCommand {}

/// Turn automation off
#[derive(Debug, Args, Clone)]
pub struct DisableCommand {}

/// Show enablement and repository opt-in state
#[derive(Debug, Args, Clone)]
pub struct StatusCommand {
    /// Inspect the repository containing this path (defaults to the
    /// current directory)
    #[arg(short, long)]
    pub path: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
