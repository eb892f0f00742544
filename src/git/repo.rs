//! Repository discovery and the per-repository opt-in gate

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the git metadata entry marking a repository root.
/// A plain `.git` file counts too, so linked worktrees are found.
pub const GIT_DIR: &str = ".git";

/// Sentinel file that opts a repository into automation.
/// Presence is the entire contract; contents are never read.
pub const MARKER_FILE: &str = ".autocommiter";

/// The topmost directory of a git working tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRoot {
    path: PathBuf,
}

impl RepositoryRoot {
    /// Find the nearest ancestor of `file` that is a repository root.
    ///
    /// Walks upward from the file's parent directory. Filesystem errors
    /// (permission denied, I/O) are logged and treated as not-found for
    /// this event, never fatal.
    pub fn locate(file: &Path) -> Option<Self> {
        Self::discover(file.parent()?)
    }

    /// Find the repository root containing `dir`, starting at `dir`
    /// itself
    pub fn discover(dir: &Path) -> Option<Self> {
        let mut current = dir;
        loop {
            match current.join(GIT_DIR).try_exists() {
                Ok(true) => {
                    debug!("Found repository root: {}", current.display());
                    return Some(Self {
                        path: current.to_path_buf(),
                    });
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        "Cannot probe {} for {}: {}",
                        current.display(),
                        GIT_DIR,
                        e
                    );
                    return None;
                }
            }
            current = current.parent()?;
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the opt-in marker exists directly inside this root.
    /// Checked fresh on every call; the marker can come and go between
    /// events without a restart.
    pub fn is_opted_in(&self) -> bool {
        self.path.join(MARKER_FILE).is_file()
    }

    /// Express `file` relative to this root, falling back to the full
    /// path when it is not underneath (staging stays robust to root
    /// renames between discovery and use).
    pub fn relativize<'a>(&self, file: &'a Path) -> &'a Path {
        file.strip_prefix(&self.path).unwrap_or(file)
    }
}
