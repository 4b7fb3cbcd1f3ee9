//! Configuration management for termfolio.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::server::auth::AuthMode;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "termfolio";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "visitors.db";

/// Default host key file name.
const HOST_KEY_FILE_NAME: &str = "host_ed25519";

/// Environment variable prefix.
const ENV_PREFIX: &str = "TERMFOLIO_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `TERMFOLIO_`, `__` between sections)
/// 2. TOML config file at `~/.config/termfolio/config.toml`
/// 3. Default values
///
/// Relative paths from the config file are resolved against the file's
/// directory. Relative paths from environment variables are kept as given,
/// so they resolve against the working directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SSH server configuration.
    pub ssh: SshConfig,
    /// Visitor counter configuration.
    pub counter: CounterConfig,
    /// Feed page configuration.
    pub feed: FeedConfig,
}

/// SSH server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    /// Address to bind.
    pub address: String,
    /// Port to listen on.
    pub port: u16,
    /// Path to the ed25519 host key.
    /// Defaults to `~/.local/share/termfolio/host_ed25519`
    pub host_key_path: Option<PathBuf>,
    /// How visitors authenticate.
    pub auth_mode: AuthMode,
    /// Path to an OpenSSH `authorized_keys` file (for `authorized_keys` mode).
    pub authorized_keys: Option<PathBuf>,
    /// Idle sessions are dropped after this many seconds. 0 disables.
    pub inactivity_timeout_secs: u64,
}

/// Visitor counter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// Count unique visitors.
    pub enabled: bool,
    /// Path to the visitor database.
    /// Defaults to `~/.local/share/termfolio/visitors.db`
    pub database_path: Option<PathBuf>,
    /// Path to a GeoLite2 Country database. Enables country stats.
    pub geolite_path: Option<PathBuf>,
}

/// Feed page configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// RSS or Atom feed URL.
    pub url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// How long a fetched feed stays fresh, in seconds.
    pub cache_ttl_secs: u64,
    /// Maximum number of posts kept from the feed.
    pub max_items: usize,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 2222,
            host_key_path: None, // Will be resolved to default at runtime
            auth_mode: AuthMode::None,
            authorized_keys: None,
            inactivity_timeout_secs: 3600,
        }
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            database_path: None,
            geolite_path: None,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "https://note.toshiki.dev/feed.xml".to_string(),
            timeout_secs: 5,
            cache_ttl_secs: 15 * 60,
            max_items: 25,
        }
    }
}

impl Config {
    /// Load configuration from all sources using the default config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// A custom path must exist; the default path may be absent, in which
    /// case defaults and environment variables are used. Relative paths in
    /// the file are resolved against the file's directory before the
    /// environment layer is applied.
    ///
    /// # Errors
    ///
    /// Returns an error if a custom file is missing, or if loading, parsing,
    /// or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let user_provided = config_path.is_some();
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        if user_provided && !config_file.exists() {
            return Err(Error::ConfigNotFound { path: config_file });
        }

        let mut from_file: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .extract()?;
        if let Some(base_dir) = config_file.parent() {
            from_file.resolve_relative_paths(base_dir);
        }

        let config: Config = Figment::from(Serialized::defaults(from_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Rebase every relative file path onto `base_dir`.
    fn resolve_relative_paths(&mut self, base_dir: &Path) {
        if base_dir.as_os_str().is_empty() {
            return;
        }
        for path in [
            &mut self.ssh.host_key_path,
            &mut self.ssh.authorized_keys,
            &mut self.counter.database_path,
            &mut self.counter.geolite_path,
        ] {
            if let Some(p) = path.as_mut() {
                if !p.as_os_str().is_empty() && p.is_relative() {
                    *p = base_dir.join(&*p);
                }
            }
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.ssh.port == 0 {
            return Err(Error::config_validation("ssh.port must be greater than 0"));
        }

        if self.ssh.auth_mode == AuthMode::AuthorizedKeys
            && self
                .ssh
                .authorized_keys
                .as_ref()
                .map_or(true, |p| p.as_os_str().is_empty())
        {
            return Err(Error::config_validation(
                "ssh.authorized_keys must be set when auth_mode is authorized_keys",
            ));
        }

        if !(self.feed.url.starts_with("http://") || self.feed.url.starts_with("https://")) {
            return Err(Error::config_validation(format!(
                "feed.url must be an http(s) URL: {}",
                self.feed.url
            )));
        }

        if self.feed.timeout_secs == 0 {
            return Err(Error::config_validation(
                "feed.timeout_secs must be greater than 0",
            ));
        }

        if self.feed.max_items == 0 {
            return Err(Error::config_validation(
                "feed.max_items must be greater than 0",
            ));
        }

        Ok(())
    }

    /// The `address:port` pair the SSH server binds.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.ssh.address, self.ssh.port)
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.counter
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the host key path, resolving defaults if not set.
    #[must_use]
    pub fn host_key_path(&self) -> PathBuf {
        self.ssh
            .host_key_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(HOST_KEY_FILE_NAME))
    }

    /// Get the inactivity timeout as a Duration.
    #[must_use]
    pub fn inactivity_timeout(&self) -> Option<Duration> {
        if self.ssh.inactivity_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.ssh.inactivity_timeout_secs))
        }
    }
}

impl FeedConfig {
    /// Get the request timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the cache TTL as a Duration.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
