//! `termfolio` - Serve an animated portfolio over SSH
//!
//! This binary parses the command line, sets up logging and configuration,
//! and dispatches to the library's command handlers.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use termfolio::cli::{self, Cli};
use termfolio::{init_logging, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    // Execute the command
    cli::execute(&config, cli.command).await?;
    Ok(())
}
