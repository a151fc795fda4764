//! Package manager abstraction.
//!
//! Each install method is a [`PackageManager`]; the installer only sees
//! success or failure. Concrete implementations shell out through
//! [`crate::process::Cmd`].

mod apt;
mod npm;
mod pip;
mod script;

use std::path::PathBuf;

use anyhow::Result;

pub use apt::Apt;
pub use npm::Npm;
pub use pip::Pip;
pub use script::CurlScript;

use crate::platform::PlatformInfo;

pub trait PackageManager {
    /// Label used in logs and in the install marker (`npm`, `native binary`).
    fn name(&self) -> &str;

    /// Whether the tool this method needs is on the search path.
    fn is_available(&self) -> bool;

    /// Executable this method needs, for error messages.
    fn required_tool(&self) -> &str;

    /// Install `package`, pinned to `version` when given.
    fn install(&self, package: &str, version: Option<&str>) -> Result<()>;
}

/// What every package manager needs to know about the target environment.
#[derive(Debug, Clone)]
pub struct InstallContext {
    pub search_path: String,
    pub home: PathBuf,
    pub username: String,
}

impl InstallContext {
    pub fn new(search_path: impl Into<String>, platform: &PlatformInfo) -> Self {
        Self {
            search_path: search_path.into(),
            home: platform.home.clone(),
            username: platform.username.clone(),
        }
    }
}

/// Reject version strings that could smuggle shell syntax or extra arguments.
pub(crate) fn check_version(version: &str) -> Result<()> {
    let valid = !version.is_empty()
        && !version.starts_with('-')
        && version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+' | '^' | '~'));
    if !valid {
        anyhow::bail!("invalid version '{version}'");
    }
    Ok(())
}

/// Split a package spec into individual package names.
///
/// A spec may name several packages (`typescript-language-server typescript`);
/// a version pin applies to the first one only.
pub(crate) fn split_packages(package: &str) -> Vec<&str> {
    package.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_version() {
        assert!(check_version("1.0.42").is_ok());
        assert!(check_version("2.0.0-beta.1").is_ok());
        assert!(check_version("stable").is_ok());
        assert!(check_version("").is_err());
        assert!(check_version("--force").is_err());
        assert!(check_version("1.0; rm -rf /").is_err());
        assert!(check_version("$(whoami)").is_err());
    }

    #[test]
    fn test_split_packages() {
        assert_eq!(
            split_packages("typescript-language-server typescript"),
            vec!["typescript-language-server", "typescript"]
        );
        assert_eq!(split_packages("  ccusage "), vec!["ccusage"]);
    }
}
