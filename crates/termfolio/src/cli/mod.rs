//! Command-line interface for termfolio.
//!
//! This module provides the CLI structure and command handlers for the
//! `termfolio` binary.

mod commands;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, PrivacyCommand, ServeCommand, StatsCommand};

use crate::config::Config;
use crate::error::Result;
use crate::logging::Verbosity;
use crate::storage::VisitorStore;
use crate::{server, version};

/// termfolio - A portfolio you visit over SSH
///
/// Serves an animated terminal portfolio to anyone who connects with an SSH
/// client, and counts unique visitors who have not opted out.
#[derive(Debug, Parser)]
#[command(name = "termfolio")]
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
    /// Run the SSH server
    Serve(ServeCommand),

    /// Show visitor counter statistics
    Stats(StatsCommand),

    /// Change a visitor's tracking choice
    #[command(subcommand)]
    Privacy(PrivacyCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Show version information
    Version,
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}

/// Run `command` against `config`.
///
/// # Errors
///
/// Returns any error from the command.
pub async fn execute(config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Serve(cmd) => server::run(config, cmd.generate_host_key).await,
        Command::Stats(cmd) => handle_stats(config, cmd.json),
        Command::Privacy(cmd) => handle_privacy(config, &cmd),
        Command::Config(cmd) => handle_config(config, cmd),
        Command::Version => {
            println!("{}", version::version_info());
            Ok(())
        }
    }
}

fn handle_stats(config: &Config, json: bool) -> Result<()> {
    let store = VisitorStore::open(config.database_path())?;
    let stats = store.stats()?;
    let countries = config
        .counter
        .geolite_path
        .as_deref()
        .map(|path| store.country_stats(path));

    if json {
        let mut value = serde_json::to_value(&stats)?;
        if let Some(countries) = &countries {
            value["countries"] = match countries {
                Ok(countries) => serde_json::to_value(countries)?,
                Err(e) => serde_json::json!({ "error": e.to_string() }),
            };
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("termfolio stats");
    println!("---------------");
    println!("Database:      {}", store.path().display());
    println!("Visitors:      {}", stats.visitors);
    println!("Opted out:     {}", stats.opted_out);
    println!("First visit:   {}", format_time(stats.first_visit));
    println!("Latest new:    {}", format_time(stats.latest_first_visit));
    println!("Size:          {} bytes", stats.db_size_bytes);
    match countries {
        None => {}
        Some(Err(e)) => println!("Countries:     unavailable ({e})"),
        Some(Ok(countries)) if countries.top_countries.is_empty() => {
            println!("Countries:     N/A");
        }
        Some(Ok(countries)) => {
            println!("Countries:");
            for (i, country) in countries.top_countries.iter().enumerate() {
                println!("  {}. {:<18} {}", i + 1, country.name, country.visitors);
            }
        }
    }
    Ok(())
}

fn format_time(time: Option<chrono::DateTime<chrono::Utc>>) -> String {
    time.map_or_else(
        || "never".to_string(),
        |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

fn handle_privacy(config: &Config, cmd: &PrivacyCommand) -> Result<()> {
    let store = VisitorStore::open(config.database_path())?;
    let (ip, opt_out) = match cmd {
        PrivacyCommand::OptOut { ip } => (ip, true),
        PrivacyCommand::OptIn { ip } => (ip, false),
    };
    let count = store.set_opt_out(ip, opt_out)?;
    let verb = if opt_out { "opted out" } else { "opted in" };
    println!("{ip} {verb}. Unique visitors: {count}");
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                print_config(config);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn display_optional(path: Option<&Path>) -> String {
    path.map_or_else(|| "(not set)".to_string(), |p| p.display().to_string())
}

fn print_config(config: &Config) {
    println!("Current Configuration");
    println!("=====================");
    println!();
    println!("[SSH]");
    println!("  Listen address:     {}", config.listen_addr());
    println!("  Host key:           {}", config.host_key_path().display());
    println!("  Auth mode:          {}", config.ssh.auth_mode);
    println!(
        "  Authorized keys:    {}",
        display_optional(config.ssh.authorized_keys.as_deref())
    );
    println!(
        "  Inactivity timeout: {}s",
        config.ssh.inactivity_timeout_secs
    );
    println!();
    println!("[Counter]");
    println!("  Enabled:            {}", config.counter.enabled);
    println!("  Database path:      {}", config.database_path().display());
    println!(
        "  GeoLite2 path:      {}",
        display_optional(config.counter.geolite_path.as_deref())
    );
    println!();
    println!("[Feed]");
    println!("  URL:                {}", config.feed.url);
    println!("  Timeout:            {}s", config.feed.timeout_secs);
    println!("  Cache TTL:          {}s", config.feed.cache_ttl_secs);
    println!("  Max items:          {}", config.feed.max_items);
}
