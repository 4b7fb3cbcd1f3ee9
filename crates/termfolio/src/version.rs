//! Build and version information.

/// Application name.
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// One-line application description.
pub const APP_DESC: &str =
    "SSH-based interactive portfolio application served over SSH, built with Rust, russh, and ratatui.";

/// `MAJOR.MINOR.PATCH` of this build.
#[must_use]
pub fn version_string() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Name and version, e.g. `termfolio v0.1.6`.
#[must_use]
pub fn version() -> String {
    format!("{APP_NAME} v{}", version_string())
}

/// Full version banner printed by `termfolio version`.
#[must_use]
pub fn version_info() -> String {
    format!("{} - {APP_DESC}", version())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_string_is_semver() {
        let parts: Vec<&str> = version_string().split('.').collect();
        assert_eq!(parts.len(), 3);
        for part in parts {
            assert!(part.parse::<u32>().is_ok(), "not numeric: {part}");
        }
    }

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert!(info.starts_with("termfolio v"));
        assert!(info.ends_with(APP_DESC));
    }
}
