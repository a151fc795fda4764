//! Validate-before-replace patching of JSON settings files.
//!
//! A patch is merged into the current document, the result is parsed back
//! as a JSON object, and only then written to a temp file and renamed over
//! the original. Any failure leaves the original byte-identical.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::common::{atomic_write, chown_best_effort};
use crate::error::SettingsError;
use crate::process::Cmd;

/// Produces merged JSON text from the current document and a patch.
pub trait JsonMerger {
    fn name(&self) -> &str;

    /// Merge `patch` into `original`. The output is validated by the caller.
    fn merge(&self, original: &str, patch: &Value) -> Result<String, SettingsError>;
}

/// In-process recursive object merge; patch values win, objects merge key by key.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeMerger;

impl JsonMerger for NativeMerger {
    fn name(&self) -> &str {
        "native"
    }

    fn merge(&self, original: &str, patch: &Value) -> Result<String, SettingsError> {
        let mut doc: Value = serde_json::from_str(original)
            .map_err(|e| SettingsError::Merger(format!("current document: {e}")))?;
        deep_merge(&mut doc, patch);
        serde_json::to_string_pretty(&doc).map_err(|e| SettingsError::Merger(e.to_string()))
    }
}

/// Merge via `jq -s '.[0] * .[1]'`, matching what shell installers do.
#[derive(Debug, Clone)]
pub struct JqMerger {
    program: String,
}

impl Default for JqMerger {
    fn default() -> Self {
        Self {
            program: "jq".to_string(),
        }
    }
}

impl JqMerger {
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl JsonMerger for JqMerger {
    fn name(&self) -> &str {
        "jq"
    }

    fn merge(&self, original: &str, patch: &Value) -> Result<String, SettingsError> {
        let input = format!("{original}\n{patch}\n");
        let result = Cmd::new(&self.program)
            .args(["-s", ".[0] * .[1]"])
            .stdin(input)
            .error_msg("jq merge failed")
            .run()
            .map_err(|e| SettingsError::Merger(format!("{e:#}")))?;
        Ok(result.stdout)
    }
}

/// Recursively merge `patch` into `target`.
pub fn deep_merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                let nested = value.is_object() && target.get(key).is_some_and(Value::is_object);
                if !nested {
                    target.insert(key.clone(), value.clone());
                } else if let Some(existing) = target.get_mut(key) {
                    deep_merge(existing, value);
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Merged document differed; file rewritten.
    Updated,
    /// Merged document equal to the current one; nothing written.
    Unchanged,
}

/// Merge `patch` into the JSON object stored at `path`.
///
/// A missing file is treated as `{}` and created. `owner` (uid, gid) is
/// applied best-effort to a rewritten file.
pub fn patch_settings(
    path: &Path,
    patch: &Value,
    merger: &dyn JsonMerger,
    owner: Option<(u32, u32)>,
) -> Result<PatchOutcome, SettingsError> {
    let original = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => "{}".to_string(),
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let current: Value = serde_json::from_str(&original).map_err(|source| SettingsError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;

    let merged_text = merger.merge(&original, patch)?;
    let merged: Value =
        serde_json::from_str(&merged_text).map_err(|e| SettingsError::InvalidMerge {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    if !merged.is_object() {
        return Err(SettingsError::InvalidMerge {
            path: path.to_path_buf(),
            reason: "result is not a JSON object".to_string(),
        });
    }

    if merged == current && path.exists() {
        tracing::debug!("{} already up to date", path.display());
        return Ok(PatchOutcome::Unchanged);
    }

    let mut pretty = serde_json::to_string_pretty(&merged).map_err(|e| {
        SettingsError::InvalidMerge {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;
    pretty.push('\n');

    atomic_write(path, pretty).map_err(|source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some((uid, gid)) = owner {
        chown_best_effort(path, uid, gid);
    }

    tracing::info!("updated {} (merged with {})", path.display(), merger.name());
    Ok(PatchOutcome::Updated)
}

/// An MCP server entry under `mcpServers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServer {
    #[serde(rename = "type", default = "default_server_type")]
    pub kind: String,
    pub command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

fn default_server_type() -> String {
    "stdio".to_string()
}

impl McpServer {
    pub fn stdio(command: impl Into<String>) -> Self {
        Self {
            kind: default_server_type(),
            command: command.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// The patch document that registers `server` as `name`.
pub fn mcp_patch(name: &str, server: &McpServer) -> Value {
    let mut servers = Map::new();
    servers.insert(
        name.to_string(),
        serde_json::to_value(server).unwrap_or(Value::Null),
    );
    let mut root = Map::new();
    root.insert("mcpServers".to_string(), Value::Object(servers));
    Value::Object(root)
}

/// Register (or update) an MCP server in the settings file at `path`.
pub fn register_mcp_server(
    path: &Path,
    name: &str,
    server: &McpServer,
    merger: &dyn JsonMerger,
    owner: Option<(u32, u32)>,
) -> Result<PatchOutcome, SettingsError> {
    if name.trim().is_empty() {
        return Err(SettingsError::InvalidName(name.to_string()));
    }
    patch_settings(path, &mcp_patch(name, server), merger, owner)
}

/// Read the registered MCP servers from a settings file.
pub fn list_mcp_servers(path: &Path) -> Result<BTreeMap<String, McpServer>, SettingsError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let doc: Value = serde_json::from_str(&text).map_err(|source| SettingsError::Corrupt {
        path: PathBuf::from(path),
        source,
    })?;

    let mut servers = BTreeMap::new();
    if let Some(map) = doc.get("mcpServers").and_then(Value::as_object) {
        for (name, value) in map {
            match serde_json::from_value::<McpServer>(value.clone()) {
                Ok(server) => {
                    servers.insert(name.clone(), server);
                }
                Err(e) => tracing::warn!("skipping MCP server '{name}': {e}"),
            }
        }
    }
    Ok(servers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    /// Merger that always emits broken JSON.
    struct BrokenMerger;

    impl JsonMerger for BrokenMerger {
        fn name(&self) -> &str {
            "broken"
        }

        fn merge(&self, original: &str, _patch: &Value) -> Result<String, SettingsError> {
            Ok(original[..original.len() / 2].to_string())
        }
    }

    /// Merger that returns valid JSON that is not an object.
    struct ArrayMerger;

    impl JsonMerger for ArrayMerger {
        fn name(&self) -> &str {
            "array"
        }

        fn merge(&self, _original: &str, _patch: &Value) -> Result<String, SettingsError> {
            Ok("[1, 2, 3]".to_string())
        }
    }

    #[test]
    fn test_deep_merge_preserves_siblings() {
        let mut doc = json!({"mcpServers": {"a": {"command": "x"}}, "theme": "dark"});
        deep_merge(&mut doc, &json!({"mcpServers": {"b": {"command": "y"}}}));
        assert_eq!(doc["mcpServers"]["a"]["command"], "x");
        assert_eq!(doc["mcpServers"]["b"]["command"], "y");
        assert_eq!(doc["theme"], "dark");
    }

    #[test]
    fn test_deep_merge_patch_wins_on_scalars() {
        let mut doc = json!({"a": {"b": 1}, "c": [1]});
        deep_merge(&mut doc, &json!({"a": 2, "c": [2, 3]}));
        assert_eq!(doc, json!({"a": 2, "c": [2, 3]}));
    }

    #[test]
    fn test_patch_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/settings.json");
        let outcome = patch_settings(&path, &json!({"k": "v"}), &NativeMerger, None).unwrap();
        assert_eq!(outcome, PatchOutcome::Updated);
        let doc: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc, json!({"k": "v"}));
    }

    #[test]
    fn test_patch_unchanged_does_not_rewrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{\"k\":\"v\"}").unwrap();
        let outcome = patch_settings(&path, &json!({"k": "v"}), &NativeMerger, None).unwrap();
        assert_eq!(outcome, PatchOutcome::Unchanged);
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"k\":\"v\"}");
    }

    #[test]
    fn test_invalid_merge_leaves_file_byte_identical() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let original = b"{\n  \"theme\": \"dark\",\n  \"mcpServers\": {}\n}\n";
        fs::write(&path, original).unwrap();

        let err = patch_settings(&path, &json!({"x": 1}), &BrokenMerger, None).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidMerge { .. }));
        assert_eq!(fs::read(&path).unwrap(), original);

        let err = patch_settings(&path, &json!({"x": 1}), &ArrayMerger, None).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidMerge { .. }));
        assert_eq!(fs::read(&path).unwrap(), original);

        // only the settings file, no temp files
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_jq_leaves_file_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{\"theme\": \"dark\"}").unwrap();

        let merger = JqMerger::with_program("featkit-no-such-jq");
        let err = patch_settings(&path, &json!({"x": 1}), &merger, None).unwrap_err();
        assert!(matches!(err, SettingsError::Merger(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"theme\": \"dark\"}");
    }

    #[test]
    fn test_corrupt_original_is_not_touched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        let err = patch_settings(&path, &json!({"x": 1}), &NativeMerger, None).unwrap_err();
        assert!(matches!(err, SettingsError::Corrupt { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_register_and_list_mcp_server() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".claude.json");
        fs::write(&path, r#"{"numStartups": 3}"#).unwrap();

        let server = McpServer::stdio("npx")
            .args(["-y", "@playwright/mcp"])
            .env("HEADLESS", "1");
        register_mcp_server(&path, "playwright", &server, &NativeMerger, None).unwrap();

        let servers = list_mcp_servers(&path).unwrap();
        assert_eq!(servers.get("playwright"), Some(&server));

        let doc: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["numStartups"], 3);
        assert_eq!(doc["mcpServers"]["playwright"]["type"], "stdio");
    }

    #[test]
    fn test_register_rejects_empty_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".claude.json");
        let err = register_mcp_server(&path, " ", &McpServer::stdio("x"), &NativeMerger, None)
            .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidName(ref name) if name == " "));
        assert!(!path.exists());
    }

    #[test]
    fn test_mcp_patch_shape() {
        let patch = mcp_patch("fs", &McpServer::stdio("mcp-fs"));
        assert_eq!(
            patch,
            json!({"mcpServers": {"fs": {"type": "stdio", "command": "mcp-fs"}}})
        );
    }
}
