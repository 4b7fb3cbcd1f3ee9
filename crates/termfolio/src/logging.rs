//! Logging configuration for termfolio.
//!
//! Server-side diagnostics (connections, counter updates, feed fetches) go
//! through `tracing`. Visitors never see this output; it is written to the
//! operator's stderr so that stdout stays free for CLI command output.

use std::net::SocketAddr;

use tracing::{Level, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Suppress all output except errors.
    Quiet,
    /// Normal output level (info and above).
    #[default]
    Normal,
    /// Verbose output (debug and above).
    Verbose,
    /// Very verbose output (trace level).
    Trace,
}

impl Verbosity {
    /// Convert verbosity to tracing level filter.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// The default `EnvFilter` directive for this verbosity.
    ///
    /// The SSH library is kept at `warn` unless tracing is requested, since
    /// it logs every packet exchange at debug level.
    #[must_use]
    pub fn filter_directive(&self) -> String {
        let level = self.to_level_filter();
        let transport = if *self == Self::Trace {
            Level::DEBUG
        } else {
            Level::WARN
        };
        format!("termfolio={level},russh={transport}")
    }
}

/// Initialize the logging system.
///
/// Call once at startup. `RUST_LOG`, when set, replaces the filter derived
/// from `verbosity`.
///
/// # Examples
///
/// ```no_run
/// use termfolio::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    );

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = subscriber.try_init();
}

/// Span wrapping everything logged for one SSH connection.
#[must_use]
pub fn connection_span(id: u64, peer: Option<SocketAddr>) -> Span {
    match peer {
        Some(addr) => tracing::info_span!("conn", id, peer = %addr),
        None => tracing::info_span!("conn", id, peer = "unknown"),
    }
}

/// Initialize logging for tests.
///
/// Only warnings and errors are shown, routed through the test writer.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
