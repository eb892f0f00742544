//! Filesystem watcher that turns raw notify events into change events
//!
//! Raw events are debounced, filtered (git internals and directories
//! are dropped), and classified as Modified or Deleted by whether the
//! path still exists once the debounce window closes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::core::{ChangeEvent, ChangeKind};
use crate::git::GIT_DIR;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("watcher error: {0}")]
    Notify(#[from] notify::Error),
}

/// Watches directory trees and forwards change events over a channel
pub struct ChangeWatcher {
    watched_dirs: Vec<PathBuf>,
    watcher: Option<RecommendedWatcher>,
    event_tx: mpsc::Sender<ChangeEvent>,
    debounce: Duration,
    active: bool,
}

impl ChangeWatcher {
    pub fn new(event_tx: mpsc::Sender<ChangeEvent>, debounce: Duration) -> Self {
        Self {
            watched_dirs: Vec::new(),
            watcher: None,
            event_tx,
            debounce,
            active: false,
        }
    }

    /// Start watching the given directories recursively
    pub fn start(&mut self, dirs: Vec<PathBuf>) -> Result<(), WatchError> {
        if self.active {
            warn!("Watcher already active, restarting...");
            self.stop();
        }

        self.watched_dirs = dirs.clone();

        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let config = Config::default().with_compare_contents(false);
        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                if let Err(e) = notify_tx.send(result) {
                    error!("Failed to forward notify event: {}", e);
                }
            },
            config,
        )?;

        for dir in &dirs {
            if dir.exists() {
                debug!("Watching directory: {}", dir.display());
                if let Err(e) = watcher.watch(dir, RecursiveMode::Recursive) {
                    warn!("Failed to watch {}: {}", dir.display(), e);
                }
            } else {
                warn!("Directory does not exist, skipping: {}", dir.display());
            }
        }

        self.watcher = Some(watcher);
        self.active = true;

        let event_tx = self.event_tx.clone();
        let debounce = self.debounce;
        tokio::task::spawn_blocking(move || {
            Self::handle_events(notify_rx, event_tx, debounce);
        });

        info!("Watching {} directories", dirs.len());
        Ok(())
    }

    /// Drain raw notify events, batching within the debounce window,
    /// then emit one change event per surviving path
    fn handle_events(
        rx: std::sync::mpsc::Receiver<Result<Event, notify::Error>>,
        event_tx: mpsc::Sender<ChangeEvent>,
        debounce: Duration,
    ) {
        let mut pending: Vec<PathBuf> = Vec::new();

        loop {
            match rx.recv_timeout(debounce) {
                Ok(Ok(event)) => {
                    for path in event.paths {
                        if Self::is_relevant(&path) && !pending.contains(&path) {
                            pending.push(path);
                        }
                    }
                }
                Ok(Err(e)) => {
                    error!("Watch error: {}", e);
                }
                Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                    for path in pending.drain(..) {
                        let kind = if path.exists() {
                            if !path.is_file() {
                                continue;
                            }
                            ChangeKind::Modified
                        } else {
                            ChangeKind::Deleted
                        };
                        if event_tx.blocking_send(ChangeEvent::new(path, kind)).is_err() {
                            debug!("Change event receiver dropped, stopping handler");
                            return;
                        }
                    }
                }
                Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                    debug!("Watcher channel disconnected");
                    break;
                }
            }
        }
    }

    /// Paths under a `.git` directory never become change events;
    /// commits made by the pipeline itself must not re-trigger it
    fn is_relevant(path: &Path) -> bool {
        !path
            .components()
            .any(|c| c.as_os_str() == GIT_DIR)
    }

    /// Stop watching
    pub fn stop(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            for dir in &self.watched_dirs {
                let _ = watcher.unwatch(dir);
            }
        }
        self.active = false;
        info!("Watcher stopped");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn watched_dirs(&self) -> &[PathBuf] {
        &self.watched_dirs
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
