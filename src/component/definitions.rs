//! Component definitions.
//!
//! Each entry describes what gets installed and how to prove it worked.
//! Order here is the order `status --all` lists them in.

use super::{apt, npm, pip, script, Component};

/// Vendor installer for the native Claude Code binary.
pub const CLAUDE_INSTALL_SCRIPT: &str = "https://claude.ai/install.sh";

pub const CLAUDE_CODE: Component = Component {
    name: "claude-code",
    binary: "claude",
    description: "Claude Code CLI",
    primary: script(CLAUDE_INSTALL_SCRIPT, "claude"),
    fallback: Some(npm("@anthropic-ai/claude-code")),
};

pub const TMUX: Component = Component {
    name: "tmux",
    binary: "tmux",
    description: "Terminal multiplexer for parallel agent sessions",
    primary: apt("tmux"),
    fallback: None,
};

pub const AGENT_BROWSER: Component = Component {
    name: "agent-browser",
    binary: "agent-browser",
    description: "Headless browser automation for agents",
    primary: npm("agent-browser"),
    fallback: None,
};

// =============================================================================
// Token usage monitors
// =============================================================================

pub const CCUSAGE: Component = Component {
    name: "ccusage",
    binary: "ccusage",
    description: "Token usage reports from local session logs",
    primary: npm("ccusage"),
    fallback: None,
};

pub const CCBURN: Component = Component {
    name: "ccburn",
    binary: "ccburn",
    description: "Live token burn-rate monitor",
    primary: pip("ccburn"),
    fallback: Some(npm("ccburn")),
};

pub const CCSTATUSLINE: Component = Component {
    name: "ccstatusline",
    binary: "ccstatusline",
    description: "Status line renderer",
    primary: npm("ccstatusline"),
    fallback: None,
};

// =============================================================================
// Language servers
// =============================================================================

pub const PYRIGHT: Component = Component {
    name: "pyright",
    binary: "pyright-langserver",
    description: "Python language server",
    primary: npm("pyright"),
    fallback: Some(pip("pyright")),
};

pub const TYPESCRIPT_LSP: Component = Component {
    name: "typescript-language-server",
    binary: "typescript-language-server",
    description: "TypeScript/JavaScript language server",
    primary: npm("typescript-language-server typescript"),
    fallback: None,
};

pub const ALL_COMPONENTS: &[&Component] = &[
    &CLAUDE_CODE,
    &TMUX,
    &AGENT_BROWSER,
    &CCUSAGE,
    &CCBURN,
    &CCSTATUSLINE,
    &PYRIGHT,
    &TYPESCRIPT_LSP,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::validate_name;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_valid_and_unique() {
        let mut seen = HashSet::new();
        for component in ALL_COMPONENTS {
            assert!(validate_name(component.name).is_ok(), "{}", component.name);
            assert!(seen.insert(component.name), "duplicate {}", component.name);
            assert!(!component.binary.is_empty());
        }
    }

    #[test]
    fn test_fallback_differs_from_primary() {
        for component in ALL_COMPONENTS {
            if let Some(fallback) = component.fallback {
                assert_ne!(fallback.kind, component.primary.kind, "{}", component.name);
            }
        }
    }
}
