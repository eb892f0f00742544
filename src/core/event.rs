//! Change events reported by the watch adapters

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Kind of filesystem change that triggered a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// File was saved (created or modified)
    Modified,
    /// File was deleted
    Deleted,
}

impl ChangeKind {
    /// Verb used when deriving the commit message
    pub fn verb(&self) -> &'static str {
        match self {
            ChangeKind::Modified => "update",
            ChangeKind::Deleted => "delete",
        }
    }
}

/// A single file-change notification, consumed by exactly one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Absolute path of the changed file
    pub path: PathBuf,

    /// What happened to the file
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn modified(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ChangeKind::Modified)
    }

    pub fn deleted(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ChangeKind::Deleted)
    }

    /// Base name of the changed file, for commit messages and display
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Deterministic commit message derived from the change kind and base name
    pub fn commit_message(&self) -> String {
        format!("{}: {}", self.kind.verb(), self.file_name())
    }
}
