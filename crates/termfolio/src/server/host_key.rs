//! Server host key management.

use std::io::{BufRead, Write};
use std::path::Path;
use std::process::Command;

use russh_keys::key::KeyPair;
use tracing::info;

use crate::error::{Error, Result};

/// Load the host key at `path`, generating it first when missing.
///
/// A missing key is only generated after the operator confirms on the
/// terminal, unless `assume_yes` is set.
///
/// # Errors
///
/// Returns [`Error::HostKey`] if generation is declined or fails, or if the
/// key cannot be loaded.
pub fn ensure_host_key(path: &Path, assume_yes: bool) -> Result<KeyPair> {
    if !path.exists() {
        let accepted = assume_yes
            || confirm_generation(&mut std::io::stdin().lock(), &mut std::io::stderr(), path)?;
        if !accepted {
            return Err(Error::host_key(path, "host key missing and generation declined"));
        }
        generate_host_key(path)?;
    }
    load_host_key(path)
}

/// Ask whether a missing host key should be generated.
///
/// # Errors
///
/// Returns an I/O error if the prompt cannot be written or the answer read.
pub fn confirm_generation(
    input: &mut impl BufRead,
    output: &mut impl Write,
    path: &Path,
) -> Result<bool> {
    write!(
        output,
        "Host key not found at {}. Generate a new ed25519 key? [y/N] ",
        path.display()
    )?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Generate an unencrypted ed25519 key at `path` with `ssh-keygen`.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or
/// `ssh-keygen` is unavailable or fails.
pub fn generate_host_key(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let output = Command::new("ssh-keygen")
        .args(["-q", "-t", "ed25519", "-N", "", "-f"])
        .arg(path)
        .output()
        .map_err(|e| Error::host_key(path, format!("failed to run ssh-keygen: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::host_key(
            path,
            format!("ssh-keygen failed: {}", stderr.trim()),
        ));
    }

    info!("Generated host key at {}", path.display());
    Ok(())
}

/// Load the host key at `path`.
///
/// # Errors
///
/// Returns [`Error::HostKey`] if the file is missing or not a private key.
pub fn load_host_key(path: &Path) -> Result<KeyPair> {
    russh_keys::load_secret_key(path, None).map_err(|e| Error::host_key(path, e.to_string()))
}
