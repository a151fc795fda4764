//! Post-install verification.
//!
//! A tool counts as installed when a runnable entry point is found on the
//! search path or at one of its known fallback locations. Every failure mode
//! (missing file, not executable, unreadable directory) reads as "not installed".

use std::path::{Path, PathBuf};

use crate::common::is_executable;
use crate::process;

#[derive(Debug, Clone)]
pub struct Verifier {
    search_path: String,
}

impl Verifier {
    pub fn new(search_path: impl Into<String>) -> Self {
        Self {
            search_path: search_path.into(),
        }
    }

    /// Find a runnable `binary`, checking the search path first and then
    /// `fallback_paths` in order.
    pub fn locate(&self, binary: &str, fallback_paths: &[PathBuf]) -> Option<PathBuf> {
        if binary.is_empty() {
            return None;
        }

        if let Some(found) = process::which_in(binary, &self.search_path) {
            if is_executable(&found) {
                return Some(found);
            }
        }

        fallback_paths
            .iter()
            .find(|candidate| is_executable(candidate))
            .cloned()
    }

    pub fn is_installed(&self, binary: &str, fallback_paths: &[PathBuf]) -> bool {
        self.locate(binary, fallback_paths).is_some()
    }
}

/// Standard places user-level installers drop binaries.
pub fn default_fallback_paths(home: &Path, binary: &str) -> Vec<PathBuf> {
    vec![
        home.join(".local/bin").join(binary),
        home.join(".npm-global/bin").join(binary),
        PathBuf::from("/usr/local/bin").join(binary),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn write_tool(path: &Path, mode: u32) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn test_found_on_search_path() {
        let dir = TempDir::new().unwrap();
        let bin = dir.path().join("bin");
        write_tool(&bin.join("claude"), 0o755);

        let verifier = Verifier::new(bin.to_string_lossy());
        assert_eq!(verifier.locate("claude", &[]), Some(bin.join("claude")));
    }

    #[test]
    fn test_found_at_fallback_path() {
        let dir = TempDir::new().unwrap();
        let fallback = dir.path().join("home/.local/bin/claude");
        write_tool(&fallback, 0o755);

        let verifier = Verifier::new(dir.path().join("empty").to_string_lossy());
        assert_eq!(
            verifier.locate("claude", std::slice::from_ref(&fallback)),
            Some(fallback.clone())
        );
    }

    #[test]
    fn test_partial_install_not_executable() {
        let dir = TempDir::new().unwrap();
        let copied = dir.path().join("bin/claude");
        write_tool(&copied, 0o644);

        let verifier = Verifier::new(dir.path().join("bin").to_string_lossy());
        assert!(!verifier.is_installed("claude", &[copied]));
    }

    #[test]
    fn test_missing_everything() {
        let verifier = Verifier::new("/nonexistent-featkit-dir");
        assert!(!verifier.is_installed("claude", &[PathBuf::from("/nonexistent/claude")]));
        assert!(!verifier.is_installed("", &[]));
    }

    #[test]
    fn test_default_fallback_paths() {
        let paths = default_fallback_paths(Path::new("/home/node"), "claude");
        assert_eq!(paths[0], PathBuf::from("/home/node/.local/bin/claude"));
        assert_eq!(paths.len(), 3);
    }
}
