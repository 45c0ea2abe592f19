//! Command-line interface definition for junban.
//!
//! This module defines the CLI structure using clap derive macros,
//! including all subcommands and their arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{LogLevel, ENV_CONFIG_PATH};

/// junban - Dependency-ordered container provisioning
///
/// Creates and starts the containers declared in a configuration file,
/// always bringing up dependencies before the containers that need them.
#[derive(Debug, Parser)]
#[command(name = "junban")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = ENV_CONFIG_PATH)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Returns the log level requested by `-v`/`-q`, or `None` when neither
    /// flag was given and the configured level applies.
    pub fn log_level(&self) -> Option<LogLevel> {
        if self.quiet {
            return Some(LogLevel::Error);
        }

        match self.verbose {
            0 => None,
            1 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create every declared container that does not exist yet
    Create(RunArgs),

    /// Start every created container that is not running
    Start(RunArgs),

    /// Show the state of every declared container
    Status(OutputArgs),

    /// Print the dependency order without contacting the daemon
    Plan(OutputArgs),

    /// Configuration file operations
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Arguments for the `create` and `start` subcommands.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Inspect and report what would be done without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `status` and `plan` subcommands.
#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Configuration subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Validate the configuration file
    Validate,

    /// Show the current configuration
    Show,
}
