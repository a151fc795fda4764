//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `install` - Ensure components are installed
//! - `status` - List install markers, reset them
//! - `mcp` - Register MCP servers in the agent settings file
//! - `hook` - Run a guard hook on a tool-use event
//! - `preflight` - Run preflight checks
//! - `show` - Display configuration

mod hook;
mod install;
mod mcp;
mod preflight;
mod show;
mod status;

pub use hook::cmd_hook;
pub use install::cmd_install;
pub use mcp::{cmd_register_mcp, McpArgs};
pub use preflight::cmd_preflight;
pub use show::cmd_show_config;
pub use status::{cmd_reset, cmd_status};
