//! CLI output formatting

use crate::core::{RunOutcome, RunRecord, SkipReason};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Spinner shown while a push is in flight; spans the push step only
pub fn create_push_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.set_message("Pushing changes...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// One user-visible notification line per terminal outcome
pub fn format_outcome(record: &RunRecord) -> String {
    let file = record.change.file_name();
    match &record.outcome {
        RunOutcome::Skipped { reason } => {
            let explanation = match reason {
                SkipReason::NoRepository => "not inside a git repository",
                SkipReason::NotOptedIn => "repository is not opted in",
                SkipReason::NoChanges => "no changes to commit",
            };
            format!("{} {}: {}", INFO, style(&file).dim(), explanation)
        }
        RunOutcome::Committed { message } => format!(
            "{} Committed {} (no remote configured, push skipped)",
            CHECK,
            style(message).bold()
        ),
        RunOutcome::CommittedAndPushed { message } => format!(
            "{} Committed and pushed {}",
            CHECK,
            style(message).bold()
        ),
        RunOutcome::Failed { stage, detail } => format!(
            "{} {} ({}): {}",
            CROSS,
            style(&file).red(),
            stage.as_str(),
            style(detail).dim()
        ),
    }
}
