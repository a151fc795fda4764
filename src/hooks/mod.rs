//! Guard hooks run by the coding agent before a tool call.
//!
//! The agent pipes a JSON event on stdin. Exit code 2 with an `{"error": ..}`
//! body blocks the call; exit 0 allows it, optionally with a JSON response.
//! A hook never blocks because of its own failure: unparseable input allows.

pub mod dangerous;
pub mod protected;
pub mod readonly;
pub mod redirect;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Value};

pub use readonly::ReadonlyMode;

/// Exit code that tells the agent to block the tool call.
pub const BLOCK_EXIT_CODE: u8 = 2;

/// The subset of a tool-use event the hooks read.
///
/// Every other field of the event is ignored, whatever its type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookInput {
    #[serde(default, deserialize_with = "object_or_empty")]
    pub tool_input: Map<String, Value>,
}

/// `tool_input` that is not a JSON object reads as empty.
fn object_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

impl HookInput {
    /// A string field of `tool_input`, empty if absent or not a string.
    pub fn field(&self, key: &str) -> &str {
        self.tool_input
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

/// What a hook decided.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Allow,
    /// Allow, printing a structured response.
    Respond(Value),
    Block(String),
}

impl Verdict {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Block(_) => BLOCK_EXIT_CODE,
            Self::Allow | Self::Respond(_) => 0,
        }
    }

    /// Text to print on stdout, if any.
    pub fn stdout(&self) -> Option<String> {
        match self {
            Self::Allow => None,
            Self::Respond(value) => Some(value.to_string()),
            Self::Block(message) => Some(json!({ "error": message }).to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    BlockDangerous,
    GuardProtected,
    /// Keeps a read-only agent's shell commands read-only.
    GuardReadonly(ReadonlyMode),
    RedirectAgent,
}

impl HookKind {
    /// One entry per hook name; `guard-readonly` defaults to the general mode.
    pub const ALL: [Self; 4] = [
        Self::BlockDangerous,
        Self::GuardProtected,
        Self::GuardReadonly(ReadonlyMode::General),
        Self::RedirectAgent,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::BlockDangerous => "block-dangerous",
            Self::GuardProtected => "guard-protected",
            Self::GuardReadonly(_) => "guard-readonly",
            Self::RedirectAgent => "redirect-agent",
        }
    }

    /// Apply a `--mode` option. Only `guard-readonly` takes one.
    pub fn with_mode(self, mode: Option<ReadonlyMode>) -> Result<Self, String> {
        match (self, mode) {
            (kind, None) => Ok(kind),
            (Self::GuardReadonly(_), Some(mode)) => Ok(Self::GuardReadonly(mode)),
            (kind, Some(_)) => Err(format!("'{kind}' does not take --mode")),
        }
    }

    pub fn evaluate(self, input: &HookInput) -> Verdict {
        match self {
            Self::BlockDangerous => dangerous::evaluate(input),
            Self::GuardProtected => protected::evaluate(input),
            Self::GuardReadonly(mode) => readonly::evaluate(mode, input),
            Self::RedirectAgent => redirect::evaluate(input),
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HookKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| format!("unknown hook '{s}'"))
    }
}

/// Parse the raw event and run `kind` on it.
pub fn run(kind: HookKind, raw: &str) -> Verdict {
    match serde_json::from_str::<HookInput>(raw) {
        Ok(input) => kind.evaluate(&input),
        Err(e) => {
            tracing::debug!("{kind}: unparseable hook input ({e}), allowing");
            Verdict::Allow
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unparseable_input_allows() {
        for kind in HookKind::ALL {
            assert_eq!(run(kind, "not json"), Verdict::Allow);
            assert_eq!(run(kind, ""), Verdict::Allow);
        }
    }

    #[test]
    fn test_block_output() {
        let verdict = Verdict::Block("Blocked: nope".into());
        assert_eq!(verdict.exit_code(), 2);
        assert_eq!(verdict.stdout().unwrap(), r#"{"error":"Blocked: nope"}"#);
        assert_eq!(Verdict::Allow.exit_code(), 0);
        assert!(Verdict::Allow.stdout().is_none());
    }

    #[test]
    fn test_kind_round_trip_names() {
        for kind in HookKind::ALL {
            assert_eq!(kind.name().parse::<HookKind>().unwrap(), kind);
        }
        assert!("nope".parse::<HookKind>().is_err());
    }

    #[test]
    fn test_readonly_mode_option() {
        let kind: HookKind = "guard-readonly".parse().unwrap();
        assert_eq!(kind, HookKind::GuardReadonly(ReadonlyMode::General));
        assert_eq!(
            kind.with_mode(Some(ReadonlyMode::Git)),
            Ok(HookKind::GuardReadonly(ReadonlyMode::Git))
        );
        assert_eq!(HookKind::BlockDangerous.with_mode(None), Ok(HookKind::BlockDangerous));
        assert!(HookKind::GuardProtected
            .with_mode(Some(ReadonlyMode::Git))
            .is_err());
    }

    #[test]
    fn test_unrelated_fields_of_any_type_are_ignored() {
        let raw = r#"{"session_id": null, "tool_name": 7, "hook_event_name": ["x"],
                      "tool_input": {"command": "rm -rf /"}}"#;
        assert!(matches!(run(HookKind::BlockDangerous, raw), Verdict::Block(_)));

        let raw = r#"{"session_id": "s1", "tool_name": 7, "tool_input": {"file_path": "/app/.env"}}"#;
        assert!(matches!(run(HookKind::GuardProtected, raw), Verdict::Block(_)));
    }

    #[test]
    fn test_non_object_tool_input_is_empty() {
        for raw in [
            r#"{"tool_input": null}"#,
            r#"{"tool_input": "rm -rf /"}"#,
            r#"{"tool_input": [1, 2]}"#,
        ] {
            let input: HookInput = serde_json::from_str(raw).unwrap();
            assert!(input.tool_input.is_empty(), "{raw}");
            for kind in HookKind::ALL {
                assert_eq!(run(kind, raw), Verdict::Allow);
            }
        }
    }

    #[test]
    fn test_non_string_field_is_empty() {
        let input: HookInput =
            serde_json::from_str(r#"{"tool_input": {"command": 42}}"#).unwrap();
        assert_eq!(input.field("command"), "");
    }
}
