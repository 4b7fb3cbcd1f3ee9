//! Visitor authentication.
//!
//! The portfolio is public by default: in [`AuthMode::None`] anyone can
//! connect without credentials. The other modes gate access on SSH public
//! keys.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use russh::MethodSet;
use russh_keys::key::PublicKey;
use russh_keys::PublicKeyBase64;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::SshConfig;
use crate::error::{Error, Result};

/// How visitors authenticate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// No credentials; offered public keys are rejected.
    #[default]
    None,
    /// Only keys listed in an `authorized_keys` file.
    AuthorizedKeys,
    /// Any public key.
    AllowAll,
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::AuthorizedKeys => "authorized_keys",
            Self::AllowAll => "allow_all",
        };
        f.write_str(name)
    }
}

/// Public keys from an OpenSSH `authorized_keys` file.
#[derive(Debug, Clone, Default)]
pub struct AuthorizedKeys {
    keys: HashSet<String>,
}

/// Key types accepted in an `authorized_keys` line.
const KEY_TYPE_PREFIXES: [&str; 3] = ["ssh-", "ecdsa-", "sk-"];

impl AuthorizedKeys {
    /// Read and parse an `authorized_keys` file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthorizedKeys`] if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::authorized_keys(path, e.to_string()))?;
        Ok(Self::parse(&contents, path))
    }

    /// Parse `authorized_keys` text.
    ///
    /// Blank lines and comments are skipped. Lines without a parseable key
    /// are logged and skipped. Leading options such as `no-pty` are ignored.
    #[must_use]
    pub fn parse(contents: &str, path: &Path) -> Self {
        let mut keys = HashSet::new();
        for (number, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match parse_line(line) {
                Some(key) => {
                    keys.insert(key);
                }
                None => warn!(
                    "Skipping malformed authorized key at {}:{}",
                    path.display(),
                    number + 1
                ),
            }
        }
        Self { keys }
    }

    /// Whether `key` is listed.
    #[must_use]
    pub fn contains(&self, key: &PublicKey) -> bool {
        self.keys.contains(&key.public_key_base64())
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no key was loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// The canonical base64 blob of the key on `line`.
fn parse_line(line: &str) -> Option<String> {
    let mut fields = line.split_whitespace();
    fields.find(|field| KEY_TYPE_PREFIXES.iter().any(|p| field.starts_with(p)))?;
    let blob = fields.next()?;
    russh_keys::parse_public_key_base64(blob)
        .ok()
        .map(|key| key.public_key_base64())
}

/// The authentication decision for a running server.
#[derive(Debug, Clone)]
pub enum AuthPolicy {
    /// Admit everyone without credentials.
    Open,
    /// Admit listed keys only.
    Keys(AuthorizedKeys),
    /// Admit any key.
    AnyKey,
}

impl AuthPolicy {
    /// Build the policy for `ssh`.
    ///
    /// An unreadable or empty `authorized_keys` file yields a policy that
    /// rejects every visitor.
    #[must_use]
    pub fn from_config(ssh: &SshConfig) -> Self {
        match ssh.auth_mode {
            AuthMode::None => Self::Open,
            AuthMode::AllowAll => {
                warn!("auth_mode is allow_all: any public key will be accepted");
                Self::AnyKey
            }
            AuthMode::AuthorizedKeys => {
                let keys = match ssh.authorized_keys.as_deref() {
                    Some(path) => AuthorizedKeys::load(path).unwrap_or_else(|e| {
                        warn!("{}", e);
                        AuthorizedKeys::default()
                    }),
                    None => AuthorizedKeys::default(),
                };
                if keys.is_empty() {
                    warn!("No authorized keys loaded; all connections will be rejected");
                } else {
                    info!("Loaded {} authorized keys", keys.len());
                }
                Self::Keys(keys)
            }
        }
    }

    /// Methods advertised to clients.
    #[must_use]
    pub fn methods(&self) -> MethodSet {
        match self {
            Self::Open => MethodSet::NONE,
            Self::Keys(_) | Self::AnyKey => MethodSet::PUBLICKEY,
        }
    }

    /// Whether a client may log in without credentials.
    #[must_use]
    pub fn allows_none(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Whether a client offering `key` may log in.
    #[must_use]
    pub fn allows_key(&self, user: &str, key: &PublicKey) -> bool {
        match self {
            Self::Open => false,
            Self::AnyKey => {
                warn!("Accepting public key for {} (allow_all)", user);
                true
            }
            Self::Keys(keys) => {
                let allowed = keys.contains(key);
                debug!("Public key for {}: allowed={}", user, allowed);
                allowed
            }
        }
    }
}
