//! Target user and host platform, resolved once at startup.
//!
//! DevContainer features receive `USERNAME` as `automatic`, `auto`, `none`
//! or a concrete name. Automatic resolution prefers the conventional
//! container users, then whoever owns uid 1000, then root.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Users tried, in order, when the username is automatic.
const CONVENTIONAL_USERS: &[&str] = &["vscode", "node", "codespace"];

/// One parsed `/etc/passwd` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswdEntry {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
    pub home: PathBuf,
    pub shell: String,
}

/// Parse a single `name:x:uid:gid:gecos:home:shell` line.
pub fn parse_passwd_line(line: &str) -> Option<PasswdEntry> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() < 7 {
        return None;
    }
    Some(PasswdEntry {
        name: fields[0].to_string(),
        uid: fields[2].parse().ok()?,
        gid: fields[3].parse().ok()?,
        home: PathBuf::from(fields[5]),
        shell: fields[6].to_string(),
    })
}

/// Parse the full contents of a passwd file, skipping malformed lines.
pub fn parse_passwd(content: &str) -> Vec<PasswdEntry> {
    content.lines().filter_map(parse_passwd_line).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    pub username: String,
    pub uid: u32,
    pub gid: u32,
    pub home: PathBuf,
    /// Machine architecture as reported by the OS (`x86_64`, `aarch64`).
    pub arch: String,
}

impl PlatformInfo {
    /// Resolve against the host's `/etc/passwd`.
    pub fn detect(requested_user: &str) -> Result<Self> {
        Self::detect_from(Path::new("/etc/passwd"), requested_user)
    }

    /// Resolve against an arbitrary passwd file.
    pub fn detect_from(passwd: &Path, requested_user: &str) -> Result<Self> {
        let content = fs::read_to_string(passwd)
            .with_context(|| format!("Failed to read {}", passwd.display()))?;
        Ok(Self::resolve(&parse_passwd(&content), requested_user))
    }

    /// Pick the target user from parsed entries.
    ///
    /// A concrete name that does not exist in passwd falls back to root, the
    /// way feature install scripts do.
    pub fn resolve(entries: &[PasswdEntry], requested_user: &str) -> Self {
        let requested = requested_user.trim();
        let automatic = matches!(requested, "" | "auto" | "automatic");

        let chosen = if automatic {
            CONVENTIONAL_USERS
                .iter()
                .find_map(|name| entries.iter().find(|e| e.name == *name))
                .or_else(|| entries.iter().find(|e| e.uid == 1000))
        } else if requested == "none" {
            None
        } else {
            let found = entries.iter().find(|e| e.name == requested);
            if found.is_none() {
                tracing::warn!("user '{requested}' not found in passwd, falling back to root");
            }
            found
        };

        let arch = std::env::consts::ARCH.to_string();

        match chosen {
            Some(entry) => Self {
                username: entry.name.clone(),
                uid: entry.uid,
                gid: entry.gid,
                home: entry.home.clone(),
                arch,
            },
            None => {
                let root = entries.iter().find(|e| e.uid == 0);
                Self {
                    username: root.map_or_else(|| "root".to_string(), |e| e.name.clone()),
                    uid: 0,
                    gid: root.map_or(0, |e| e.gid),
                    home: root.map_or_else(
                        || dirs::home_dir().unwrap_or_else(|| PathBuf::from("/root")),
                        |e| e.home.clone(),
                    ),
                    arch,
                }
            }
        }
    }

    pub fn is_root(&self) -> bool {
        self.uid == 0
    }

    pub fn print(&self) {
        println!("Platform:");
        println!("  user: {} (uid {}, gid {})", self.username, self.uid, self.gid);
        println!("  home: {}", self.home.display());
        println!("  arch: {}", self.arch);
    }
}
