//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Generate a missing host key without asking
    #[arg(long)]
    pub generate_host_key: bool,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Visitor privacy commands.
#[derive(Debug, Subcommand)]
pub enum PrivacyCommand {
    /// Stop counting a visitor and forget their visit
    OptOut {
        /// Visitor IP address
        ip: String,
    },

    /// Resume counting a visitor
    OptIn {
        /// Visitor IP address
        ip: String,
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

    /// Show configuration file path
    Path,

    /// Validate configuration file
    Validate {
        /// Path to config file (default: standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
