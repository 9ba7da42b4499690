//! Command-line interface for ownerdash.
//!
//! This module provides the CLI structure for the `ownerdash` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, EditsCommand, ExportCommand, ServeCommand};

use crate::logging::Verbosity;

/// ownerdash - Editable landowner dashboard
///
/// Serves the owner dataset as a local web page where the Rv_Owner and
/// Packer columns can be filled in and saved to JSON files.
#[derive(Debug, Parser)]
#[command(name = "ownerdash")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the dashboard server
    Serve(ServeCommand),

    /// Write the dataset joined with edits as CSV
    Export(ExportCommand),

    /// Inspect or clear saved edits
    #[command(subcommand)]
    Edits(EditsCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
