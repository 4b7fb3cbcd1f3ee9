//! Error types for termfolio.
//!
//! This module defines all error types used throughout the termfolio crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for termfolio operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// The counter database path was empty.
    #[error("counter db path is empty")]
    EmptyDatabasePath,

    // === Geolocation Errors ===
    /// The GeoLite2 database could not be used for country statistics.
    #[error("geolite db {reason}")]
    GeoLite {
        /// Why the database is unusable.
        reason: &'static str,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// An explicitly requested configuration file does not exist.
    #[error("config file not found at {path}")]
    ConfigNotFound {
        /// The requested path.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === SSH Errors ===
    /// The SSH transport reported an error.
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// The host key could not be generated or loaded.
    #[error("host key error at {path}: {message}")]
    HostKey {
        /// Path to the host key file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// The authorized keys file could not be used.
    #[error("authorized keys error at {path}: {message}")]
    AuthorizedKeys {
        /// Path to the authorized keys file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    // === Feed Errors ===
    /// The feed request failed at the transport level.
    #[error("feed request failed: {0}")]
    FeedRequest(#[from] reqwest::Error),

    /// The feed server answered with a non-success status.
    #[error("feed request failed: {status}")]
    FeedStatus {
        /// The HTTP status line, e.g. `404 Not Found`.
        status: String,
    },

    /// The feed body could not be parsed as RSS or Atom.
    #[error("feed parse failed: {0}")]
    FeedParse(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for termfolio operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a host key error.
    #[must_use]
    pub fn host_key(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::HostKey {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an authorized keys error.
    #[must_use]
    pub fn authorized_keys(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::AuthorizedKeys {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Check if this error came from the feed layer.
    #[must_use]
    pub fn is_feed_error(&self) -> bool {
        matches!(
            self,
            Self::FeedRequest(_) | Self::FeedStatus { .. } | Self::FeedParse(_)
        )
    }
}
