//! Configuration management for featkit.
//!
//! Feature install scripts pass their options as environment variables.
//! `main` loads `.env` first (via dotenvy); real environment variables win.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::platform::PlatformInfo;
use crate::retry::{RetryPolicy, DEFAULT_ATTEMPTS, DEFAULT_DELAY, MAX_ATTEMPTS};

/// Default directory for installation markers.
pub const DEFAULT_STATE_DIR: &str = "/var/lib/devcontainer-features";

/// Search path used when neither `FEATKIT_SEARCH_PATH` nor `PATH` is set.
pub const DEFAULT_SEARCH_PATH: &str = "/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin";

/// Version value meaning "do not pin".
pub const LATEST: &str = "latest";

#[derive(Debug, Clone)]
pub struct Config {
    /// Requested tool version (`VERSION`), `latest` for no pin.
    pub version: String,
    /// Requested target user (`USERNAME`), `automatic` by default.
    pub username: String,
    /// Directory holding one marker file per component.
    pub state_dir: PathBuf,
    pub retry: RetryPolicy,
    /// JSON settings file for MCP registration. `None` means `<home>/.claude.json`.
    pub settings_path: Option<PathBuf>,
    /// PATH-style search path used by verification and tool lookup.
    pub search_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_vars(&HashMap::new())
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Self {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Build configuration from an explicit variable map.
    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let version = get("VERSION").unwrap_or(LATEST).to_string();
        let username = get("USERNAME").unwrap_or("automatic").to_string();

        let state_dir = get("FEATKIT_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR));

        let attempts = match get("FEATKIT_RETRIES").map(str::parse::<u32>) {
            Some(Ok(n)) if n > MAX_ATTEMPTS => {
                tracing::warn!("FEATKIT_RETRIES={n} exceeds {MAX_ATTEMPTS}, using {MAX_ATTEMPTS}");
                MAX_ATTEMPTS
            }
            Some(Ok(n)) => n,
            Some(Err(e)) => {
                tracing::warn!("ignoring FEATKIT_RETRIES: {e}");
                DEFAULT_ATTEMPTS
            }
            None => DEFAULT_ATTEMPTS,
        };
        let delay = match get("FEATKIT_RETRY_DELAY").map(str::parse::<u64>) {
            Some(Ok(secs)) => Duration::from_secs(secs),
            Some(Err(e)) => {
                tracing::warn!("ignoring FEATKIT_RETRY_DELAY: {e}");
                DEFAULT_DELAY
            }
            None => DEFAULT_DELAY,
        };

        let settings_path = get("FEATKIT_SETTINGS").map(PathBuf::from);

        let search_path = get("FEATKIT_SEARCH_PATH")
            .or_else(|| get("PATH"))
            .unwrap_or(DEFAULT_SEARCH_PATH)
            .to_string();

        Self {
            version,
            username,
            state_dir,
            retry: RetryPolicy::new(attempts, delay),
            settings_path,
            search_path,
        }
    }

    /// Version to pin, or `None` for latest.
    pub fn pinned_version(&self) -> Option<&str> {
        if self.version.eq_ignore_ascii_case(LATEST) {
            None
        } else {
            Some(&self.version)
        }
    }

    /// Settings file, defaulting into the target user's home.
    pub fn settings_path(&self, platform: &PlatformInfo) -> PathBuf {
        self.settings_path
            .clone()
            .unwrap_or_else(|| platform.home.join(".claude.json"))
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  VERSION: {}", self.version);
        println!("  USERNAME: {}", self.username);
        println!("  FEATKIT_STATE_DIR: {}", self.state_dir.display());
        println!(
            "  retry: {} attempts, {}s delay",
            self.retry.attempts,
            self.retry.delay.as_secs()
        );
        match &self.settings_path {
            Some(path) => println!("  FEATKIT_SETTINGS: {}", path.display()),
            None => println!("  FEATKIT_SETTINGS: <home>/.claude.json"),
        }
        println!("  search path: {}", self.search_path);
    }
}
