//! Redirects built-in agent types to the plugin's custom agents.
//!
//! Only `subagent_type` changes; every other field of the original input
//! is passed back so nothing is lost if the agent replaces rather than merges.
//! Redirects are also appended to a plain log file, `AGENT_REDIRECT_LOG`.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::{json, Value};

use super::{HookInput, Verdict};

/// Plugin namespace for the custom agents.
pub const PLUGIN_PREFIX: &str = "code-directive";

/// Environment variable naming the redirect log. Empty disables it.
pub const LOG_ENV: &str = "AGENT_REDIRECT_LOG";
pub const DEFAULT_LOG: &str = "/tmp/agent-redirect.log";

const REDIRECTS: &[(&str, &str)] = &[
    ("Explore", "explorer"),
    ("Plan", "architect"),
    ("general-purpose", "generalist"),
    ("Bash", "bash-exec"),
    ("claude-code-guide", "claude-guide"),
    ("statusline-setup", "statusline-config"),
];

/// Fully qualified custom agent for a built-in type.
pub fn target_for(subagent_type: &str) -> Option<String> {
    REDIRECTS
        .iter()
        .find(|(builtin, _)| *builtin == subagent_type)
        .map(|(_, target)| format!("{PLUGIN_PREFIX}:{target}"))
}

/// Log file for a raw `AGENT_REDIRECT_LOG` value.
pub fn log_path_from(value: Option<&str>) -> Option<PathBuf> {
    match value {
        None => Some(PathBuf::from(DEFAULT_LOG)),
        Some(v) if v.trim().is_empty() => None,
        Some(v) => Some(PathBuf::from(v)),
    }
}

/// `Explore -> code-directive:explorer`, or `None` when nothing is redirected.
pub fn log_line(input: &HookInput) -> Option<String> {
    let subagent_type = input.field("subagent_type");
    target_for(subagent_type).map(|qualified| format!("{subagent_type} -> {qualified}"))
}

/// Append `[timestamp] message` to the log at `path`.
pub fn append_log(path: &Path, message: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let ts = Utc::now().format("%Y-%m-%dT%H:%M:%S");
    writeln!(file, "[{ts}] {message}")
}

pub fn evaluate(input: &HookInput) -> Verdict {
    let subagent_type = input.field("subagent_type");
    let Some(qualified) = target_for(subagent_type) else {
        return Verdict::Allow;
    };

    tracing::info!("redirecting {subagent_type} -> {qualified}");

    let mut updated = input.tool_input.clone();
    updated.insert("subagent_type".to_string(), Value::String(qualified.clone()));

    Verdict::Respond(json!({
        "hookSpecificOutput": {
            "hookEventName": "PreToolUse",
            "permissionDecision": "allow",
            "permissionDecisionReason": format!("Redirected {subagent_type} to {qualified}"),
            "updatedInput": updated,
        }
    }))
}
