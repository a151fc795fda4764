//! Error types for installation and settings patching.
//!
//! Process plumbing and CLI handlers use `anyhow`; these enums cover the
//! failures callers are expected to match on.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("invalid component name '{0}': use letters, digits, '.', '_' or '-'")]
    InvalidComponent(String),

    #[error("unknown component '{0}' (run 'featkit status --all' to list known components)")]
    UnknownComponent(String),

    #[error("'{tool}' is not available on the search path (required by {method})")]
    MissingTool { tool: String, method: String },

    #[error("{component}: {method} failed and no fallback is defined: {reason}")]
    PrimaryFailed {
        component: String,
        method: String,
        reason: String,
    },

    #[error(
        "{component}: all install methods failed\n  primary ({primary}): {primary_reason}\n  fallback ({fallback}): {fallback_reason}"
    )]
    BothMethodsFailed {
        component: String,
        primary: String,
        primary_reason: String,
        fallback: String,
        fallback_reason: String,
    },

    #[error("failed to update install marker {}: {source}", path.display())]
    Marker {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file {} is not valid JSON: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("merge produced invalid JSON, {} left untouched: {reason}", path.display())]
    InvalidMerge { path: PathBuf, reason: String },

    #[error("json merge tool failed: {0}")]
    Merger(String),

    #[error("invalid MCP server name '{0}'")]
    InvalidName(String),

    #[error("failed to write settings file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
