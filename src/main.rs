//! featkit - DevContainer feature installer.
//!
//! Installs tools idempotently (primary method, verified, with fallback),
//! wires MCP servers into the agent settings file and runs guard hooks.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use featkit::commands::{self, McpArgs};
use featkit::config::Config;
use featkit::hooks::{HookKind, ReadonlyMode};
use featkit::platform::PlatformInfo;

#[derive(Parser)]
#[command(name = "featkit")]
#[command(about = "DevContainer feature installer")]
#[command(
    after_help = "QUICK START:\n  featkit preflight              Check package managers\n  featkit install claude-code    Install (no-op if already installed)\n  featkit status --all           List components\n\nConfiguration comes from the environment (VERSION, USERNAME, FEATKIT_*)."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ensure components are installed (primary method, then fallback)
    Install {
        /// Component names, optionally pinned as name@version (see `featkit status --all`)
        #[arg(required = true)]
        components: Vec<String>,
    },

    /// Show install markers
    Status {
        /// Only this component
        component: Option<String>,
        /// List every known component and whether it is runnable
        #[arg(long)]
        all: bool,
    },

    /// Remove a component's install marker (forces re-verification)
    Reset { component: String },

    /// Register an MCP server in the agent settings file
    RegisterMcp {
        /// Server name under `mcpServers`
        name: String,
        /// Executable that starts the server
        #[arg(long)]
        command: String,
        /// Argument for the server command (repeatable)
        #[arg(long = "arg", allow_hyphen_values = true)]
        args: Vec<String>,
        /// Environment variable KEY=VALUE (repeatable)
        #[arg(long)]
        env: Vec<String>,
        /// Settings file (default: FEATKIT_SETTINGS or <home>/.claude.json)
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Merge with the external jq tool
        #[arg(long)]
        jq: bool,
    },

    /// Run a guard hook on a tool-use event from stdin (exit 2 blocks)
    Hook {
        /// block-dangerous, guard-protected, guard-readonly or redirect-agent
        kind: HookKind,
        /// guard-readonly only: general-readonly (default) or git-readonly
        #[arg(long)]
        mode: Option<ReadonlyMode>,
    },

    /// Run preflight checks (package managers, state directory, user)
    Preflight {
        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },

    /// Show resolved configuration and platform
    Show,
}

fn init_logging() {
    // stderr only: hook verdicts and reports own stdout.
    let filter = EnvFilter::try_from_env("FEATKIT_LOG")
        .unwrap_or_else(|_| EnvFilter::new("featkit=info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Configuration and target user, resolved once per invocation.
fn resolve() -> Result<(Config, PlatformInfo)> {
    let config = Config::load();
    let platform = PlatformInfo::detect(&config.username)?;
    Ok((config, platform))
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load .env if present
    dotenvy::dotenv().ok();
    init_logging();

    match cli.command {
        // Hooks run on every agent tool call; keep them free of user detection.
        Commands::Hook { kind, mode } => {
            let kind = kind.with_mode(mode).map_err(anyhow::Error::msg)?;
            return commands::cmd_hook(kind);
        }
        Commands::Install { components } => {
            let (config, platform) = resolve()?;
            commands::cmd_install(&config, &platform, &components)?;
        }
        Commands::Status { component, all } => {
            let (config, platform) = resolve()?;
            commands::cmd_status(&config, &platform, component.as_deref(), all)?;
        }
        Commands::Reset { component } => {
            commands::cmd_reset(&Config::load(), &component)?;
        }
        Commands::RegisterMcp {
            name,
            command,
            args,
            env,
            settings,
            jq,
        } => {
            let (config, platform) = resolve()?;
            let args = McpArgs {
                name,
                command,
                args,
                env,
                settings,
                use_jq: jq,
            };
            commands::cmd_register_mcp(&config, &platform, &args)?;
        }
        Commands::Preflight { strict } => {
            let (config, platform) = resolve()?;
            commands::cmd_preflight(&config, &platform, strict)?;
        }
        Commands::Show => {
            let (config, platform) = resolve()?;
            commands::cmd_show_config(&config, &platform);
        }
    }

    Ok(ExitCode::SUCCESS)
}
