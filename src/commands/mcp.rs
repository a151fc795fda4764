//! Register-MCP command - adds an MCP server to the agent settings file.

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::config::Config;
use crate::platform::PlatformInfo;
use crate::settings::{self, JqMerger, JsonMerger, McpServer, NativeMerger, PatchOutcome};

/// Arguments of the register-mcp command.
#[derive(Debug, Clone, Default)]
pub struct McpArgs {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    /// `KEY=VALUE` pairs.
    pub env: Vec<String>,
    pub settings: Option<PathBuf>,
    /// Merge with the external `jq` tool instead of in-process.
    pub use_jq: bool,
}

/// Build the server entry from CLI arguments.
pub fn server_from_args(args: &McpArgs) -> Result<McpServer> {
    if args.command.trim().is_empty() {
        bail!("--command must not be empty");
    }
    let mut server = McpServer::stdio(&args.command).args(args.args.iter().cloned());
    for pair in &args.env {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("invalid --env '{pair}', expected KEY=VALUE");
        };
        if key.is_empty() {
            bail!("invalid --env '{pair}', empty key");
        }
        server = server.env(key, value);
    }
    Ok(server)
}

/// Execute the register-mcp command.
pub fn cmd_register_mcp(config: &Config, platform: &PlatformInfo, args: &McpArgs) -> Result<()> {
    let server = server_from_args(args)?;
    let path = args
        .settings
        .clone()
        .unwrap_or_else(|| config.settings_path(platform));

    let merger: Box<dyn JsonMerger> = if args.use_jq {
        Box::new(JqMerger::default())
    } else {
        Box::new(NativeMerger)
    };

    let outcome = settings::register_mcp_server(
        &path,
        &args.name,
        &server,
        merger.as_ref(),
        Some((platform.uid, platform.gid)),
    )?;

    match outcome {
        PatchOutcome::Updated => println!("Registered MCP server '{}' in {}", args.name, path.display()),
        PatchOutcome::Unchanged => println!(
            "MCP server '{}' already registered in {}",
            args.name,
            path.display()
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_from_args() {
        let args = McpArgs {
            name: "browser".into(),
            command: "agent-browser".into(),
            args: vec!["mcp".into()],
            env: vec!["HEADLESS=1".into(), "URL=http://x?a=b".into()],
            ..Default::default()
        };
        let server = server_from_args(&args).unwrap();
        assert_eq!(server.args, vec!["mcp"]);
        assert_eq!(server.env.get("URL").map(String::as_str), Some("http://x?a=b"));
    }

    #[test]
    fn test_server_from_args_rejects_bad_env() {
        let args = McpArgs {
            command: "x".into(),
            env: vec!["NOEQUALS".into()],
            ..Default::default()
        };
        assert!(server_from_args(&args).is_err());
        assert!(server_from_args(&McpArgs::default()).is_err());
    }
}
