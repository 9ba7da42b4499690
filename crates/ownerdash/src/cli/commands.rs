//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Arguments for `ownerdash serve`.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Interface to listen on (overrides `server.host`)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides `server.port`)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for `ownerdash export`.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Edit map commands.
#[derive(Debug, Subcommand)]
pub enum EditsCommand {
    /// Print both edit maps
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Remove every Rv_Owner and Packer edit
    Clear {
        /// Confirm clearing without a prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_command_debug() {
        let cmd = ServeCommand {
            host: None,
            port: Some(9000),
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("9000"));
    }

    #[test]
    fn test_edits_command_debug() {
        let cmd = EditsCommand::Clear { yes: true };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Clear"));
        assert!(debug_str.contains("yes"));
    }

    #[test]
    fn test_export_command_debug() {
        let cmd = ExportCommand {
            output: Some(PathBuf::from("out.csv")),
        };
        assert!(format!("{cmd:?}").contains("out.csv"));
    }
}
