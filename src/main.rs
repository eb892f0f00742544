use anyhow::{Context, Result};
use autocommiter::cli::commands::{RunCommand, StatusCommand, WatchCommand};
use autocommiter::cli::output::*;
use autocommiter::cli::{Cli, Command};
use autocommiter::{
    AutoCommitPipeline, ChangeEvent, ChangeKind, ChangeWatcher, CommitQueue, EnablementState,
    GitRunner, PipelineEvent, RepositoryRoot, Settings,
};
use indicatif::ProgressBar;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Watch(cmd) => watch(cmd, &cli).await?,
        Command::Run(cmd) => run_once(cmd, &cli).await?,
        Command::Enable(_) => set_enabled(&cli, true)?,
        Command::Disable(_) => set_enabled(&cli, false)?,
        Command::Status(cmd) => status(cmd, &cli)?,
    }

    Ok(())
}

fn settings_path(cli: &Cli) -> PathBuf {
    cli.config
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(Settings::default_path)
}

/// Spinner spanning the push step only, driven by pipeline events
fn attach_push_spinner(pipeline: &mut AutoCommitPipeline<GitRunner>) {
    let spinner: Arc<Mutex<Option<ProgressBar>>> = Arc::new(Mutex::new(None));
    pipeline.add_event_handler(move |event| match event {
        PipelineEvent::PushStarted { .. } => {
            *spinner.lock().unwrap() = Some(create_push_spinner());
        }
        PipelineEvent::RunFinished { .. } => {
            if let Some(bar) = spinner.lock().unwrap().take() {
                bar.finish_and_clear();
            }
        }
        PipelineEvent::RunStarted { .. } => {}
    });
}

async fn watch(cmd: &WatchCommand, cli: &Cli) -> Result<()> {
    let settings_path = settings_path(cli);
    let settings = Settings::load_or_default(&settings_path);
    let enablement = EnablementState::new(&settings_path);

    let git = GitRunner::from_settings(&settings);
    let mut pipeline = AutoCommitPipeline::new(git);
    attach_push_spinner(&mut pipeline);
    pipeline.add_event_handler(|event| {
        // One user-visible notification per terminal outcome
        if let PipelineEvent::RunFinished { record } = event {
            if record.outcome.is_error() {
                eprintln!("{}", format_outcome(&record));
            } else {
                println!("{}", format_outcome(&record));
            }
        }
    });
    let queue = CommitQueue::start(pipeline);

    let dirs: Vec<PathBuf> = cmd
        .path
        .iter()
        .map(|p| std::path::absolute(p))
        .collect::<std::io::Result<_>>()
        .context("Failed to resolve watch directory")?;

    let (tx, mut rx) = mpsc::channel(256);
    let mut watcher = ChangeWatcher::new(tx, Duration::from_millis(settings.debounce_ms));
    watcher.start(dirs.clone())?;

    println!(
        "{} Watching {} for changes (Ctrl-C to stop)",
        ROCKET,
        style(
            dirs.iter()
                .map(|d| d.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )
        .bold()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            maybe_change = rx.recv() => {
                let Some(change) = maybe_change else { break };
                // Enablement is read once per event, before admission;
                // toggling never affects a run already in the queue
                if !enablement.read() {
                    debug!("Automation disabled, ignoring {}", change.path.display());
                    continue;
                }
                let _ = queue.submit(change);
            }
        }
    }

    watcher.stop();
    println!("\n{} Stopped", INFO);
    Ok(())
}

async fn run_once(cmd: &RunCommand, cli: &Cli) -> Result<()> {
    let settings_path = settings_path(cli);
    let settings = Settings::load_or_default(&settings_path);

    if !settings.enabled {
        println!(
            "{} Automation is disabled; turn it on with {}",
            WARN,
            style("autocommiter enable").bold()
        );
        return Ok(());
    }

    // The file may already be gone for deletions, so resolve without
    // touching the filesystem
    let path = std::path::absolute(&cmd.file)
        .with_context(|| format!("Failed to resolve path: {}", cmd.file))?;
    let kind = if cmd.deleted {
        ChangeKind::Deleted
    } else {
        ChangeKind::Modified
    };
    let change = ChangeEvent::new(path, kind);

    let git = GitRunner::from_settings(&settings);
    let mut pipeline = AutoCommitPipeline::new(git);
    if !cmd.json {
        attach_push_spinner(&mut pipeline);
    }
    let queue = CommitQueue::start(pipeline);

    let record = queue
        .submit(change)
        .record()
        .await
        .context("Commit queue terminated before the run finished")?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("{}", format_outcome(&record));
    }

    if record.outcome.is_error() {
        std::process::exit(1);
    }
    Ok(())
}

fn set_enabled(cli: &Cli, enabled: bool) -> Result<()> {
    let path = settings_path(cli);
    let mut settings = Settings::load_or_default(&path);
    settings.enabled = enabled;
    settings.save(&path)?;

    println!(
        "{} Auto commit {}",
        CHECK,
        if enabled {
            style("enabled").green()
        } else {
            style("disabled").yellow()
        }
    );
    Ok(())
}

fn status(cmd: &StatusCommand, cli: &Cli) -> Result<()> {
    let settings_path = settings_path(cli);
    let settings = Settings::load_or_default(&settings_path);

    let probe = cmd.path.clone().unwrap_or_else(|| ".".to_string());
    let probe = std::path::absolute(&probe)
        .with_context(|| format!("Failed to resolve path: {}", probe))?;
    let root = RepositoryRoot::discover(&probe);

    if cmd.json {
        let data = serde_json::json!({
            "enabled": settings.enabled,
            "settings_file": settings_path,
            "repository": root.as_ref().map(|r| r.path()),
            "opted_in": root.as_ref().map(|r| r.is_opted_in()).unwrap_or(false),
        });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!(
        "{} Automation: {}",
        INFO,
        if settings.enabled {
            style("enabled").green()
        } else {
            style("disabled").yellow()
        }
    );
    println!(
        "{} Settings file: {}",
        INFO,
        style(settings_path.display()).dim()
    );

    match root {
        Some(root) => {
            println!(
                "{} Repository: {}",
                INFO,
                style(root.path().display()).bold()
            );
            if root.is_opted_in() {
                println!("{} Opted in via {}", CHECK, autocommiter::MARKER_FILE);
            } else {
                println!(
                    "{} Not opted in; create {} at the repository root to opt in",
                    WARN,
                    style(autocommiter::MARKER_FILE).bold()
                );
            }
        }
        None => {
            println!(
                "{} No git repository found at {}",
                WARN,
                style(probe.display()).dim()
            );
        }
    }
    Ok(())
}
