//! Persisted settings from YAML

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

fn default_enabled() -> bool {
    true
}

fn default_git_path() -> String {
    "git".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_max_output_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_debounce_ms() -> u64 {
    500
}

/// Tool settings, round-tripped to a YAML file
///
/// The `enabled` toggle is the process-wide enablement state; it is
/// re-read at the start of each event so edits (or the `enable` /
/// `disable` commands) take effect without restarting the watcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Master enable/disable toggle
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Path to the git executable
    #[serde(default = "default_git_path")]
    pub git_path: String,

    /// Timeout per git command, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Captured-output bound per git command, in bytes
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,

    /// Watcher debounce window, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            git_path: default_git_path(),
            timeout_secs: default_timeout_secs(),
            max_output_bytes: default_max_output_bytes(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Settings {
    /// Default settings file location (`<config dir>/autocommiter/config.yaml`)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("autocommiter")
            .join("config.yaml")
    }

    /// Parse settings from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse settings YAML")
    }

    /// Load settings from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read settings file: {}", path.as_ref().display())
        })?;
        Self::from_yaml(&content)
    }

    /// Load settings, falling back to defaults when the file is missing
    /// or unreadable
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Using default settings: {:#}", e);
                Self::default()
            }
        }
    }

    /// Write settings to a file, creating parent directories as needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }
        let yaml = serde_yaml::to_string(self).context("Failed to serialize settings")?;
        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))
    }
}

/// Fresh read of the persisted enable toggle
///
/// Consulted exactly once per event, before a run is admitted to the
/// queue; toggling never affects a run already in flight.
#[derive(Debug, Clone)]
pub struct EnablementState {
    settings_path: PathBuf,
}

impl EnablementState {
    pub fn new(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
        }
    }

    pub fn read(&self) -> bool {
        Settings::load_or_default(&self.settings_path).enabled
    }
}
