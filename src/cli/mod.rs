//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{DisableCommand, EnableCommand, RunCommand, StatusCommand, WatchCommand};

/// Auto commit and push saved changes in opted-in repositories
#[derive(Debug, Parser, Clone)]
#[command(name = "autocommiter")]
#[command(author = "Autocommiter Contributors")]
#[command(version = "0.1.0")]
#[command(
    about = "Automatically stage, commit, and push saved changes in opted-in git repositories",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the settings file
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Watch directories and auto-commit saved changes
    Watch(WatchCommand),

    /// Process a single change event and exit
    Run(RunCommand),

    /// Turn automation on
    Enable(EnableCommand),

    /// Turn automation off
    Disable(DisableCommand),

    /// Show enablement and repository opt-in state
    Status(StatusCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

use std::ffi::OsString;
