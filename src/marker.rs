//! Installation markers.
//!
//! One file per component under the state directory, holding a single
//! `<timestamp> - <method>` line. Markers are always rewritten wholesale via
//! temp-file + rename. Anything that does not parse is treated as absent.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use walkdir::WalkDir;

use crate::common::{atomic_write, chown_best_effort};
use crate::error::InstallError;

/// File extension for marker files.
pub const MARKER_EXT: &str = "installed";

/// Record of a verified installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRecord {
    pub component: String,
    /// Method label, e.g. `native binary` or `npm fallback`.
    pub method: String,
    pub timestamp: DateTime<Utc>,
}

impl InstallRecord {
    pub fn new(component: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            method: method.into(),
            timestamp: Utc::now(),
        }
    }

    /// The marker file line, newline-terminated.
    pub fn to_line(&self) -> String {
        format!(
            "{} - {}\n",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.method
        )
    }

    /// Parse marker content for `component`.
    ///
    /// Exactly one non-empty line is accepted; the timestamp must be RFC 3339
    /// and the method must be non-empty.
    pub fn parse(component: &str, content: &str) -> Option<Self> {
        let mut lines = content.lines().filter(|l| !l.trim().is_empty());
        let line = lines.next()?;
        if lines.next().is_some() {
            return None;
        }

        let (stamp, method) = line.split_once(" - ")?;
        let method = method.trim();
        if method.is_empty() {
            return None;
        }
        let timestamp = DateTime::parse_from_rfc3339(stamp.trim())
            .ok()?
            .with_timezone(&Utc);

        Some(Self {
            component: component.to_string(),
            method: method.to_string(),
            timestamp,
        })
    }
}

impl fmt::Display for InstallRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.component,
            self.method,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

/// Marker files under a single state directory.
#[derive(Debug, Clone)]
pub struct MarkerStore {
    dir: PathBuf,
}

impl MarkerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, component: &str) -> PathBuf {
        self.dir.join(format!("{component}.{MARKER_EXT}"))
    }

    /// Read the marker for `component`. Missing or corrupt markers are `None`.
    pub fn read(&self, component: &str) -> Option<InstallRecord> {
        let path = self.path(component);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("cannot read marker {}: {e} (treating as absent)", path.display());
                return None;
            }
        };

        let record = InstallRecord::parse(component, &content);
        if record.is_none() {
            tracing::warn!("marker {} is corrupt (treating as absent)", path.display());
        }
        record
    }

    /// Atomically write `record`, then hand the file to `owner` if given.
    pub fn write(
        &self,
        record: &InstallRecord,
        owner: Option<(u32, u32)>,
    ) -> Result<PathBuf, InstallError> {
        let path = self.path(&record.component);
        atomic_write(&path, record.to_line()).map_err(|source| InstallError::Marker {
            path: path.clone(),
            source,
        })?;

        if let Some((uid, gid)) = owner {
            chown_best_effort(&path, uid, gid);
        }

        tracing::debug!("wrote marker {}", path.display());
        Ok(path)
    }

    /// Delete the marker. Returns whether a file was removed.
    pub fn remove(&self, component: &str) -> Result<bool, InstallError> {
        let path = self.path(component);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(InstallError::Marker { path, source }),
        }
    }

    /// All readable markers, sorted by component name.
    pub fn list(&self) -> Vec<InstallRecord> {
        let mut records: Vec<InstallRecord> = WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some(MARKER_EXT) {
                    return None;
                }
                let component = path.file_stem()?.to_str()?.to_string();
                self.read(&component)
            })
            .collect();
        records.sort_by(|a, b| a.component.cmp(&b.component));
        records
    }
}
