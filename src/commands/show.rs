//! Show command - displays resolved configuration.

use crate::component::ALL_COMPONENTS;
use crate::config::Config;
use crate::platform::PlatformInfo;
use crate::settings;

pub fn cmd_show_config(config: &Config, platform: &PlatformInfo) {
    config.print();
    println!();
    platform.print();
    println!();
    println!("Components:");
    for component in ALL_COMPONENTS {
        match component.fallback {
            Some(fallback) => println!(
                "  {:<28} {} (fallback: {fallback})",
                component.name, component.primary
            ),
            None => println!("  {:<28} {}", component.name, component.primary),
        }
    }

    let settings_path = config.settings_path(platform);
    println!();
    println!("MCP servers ({}):", settings_path.display());
    match settings::list_mcp_servers(&settings_path) {
        Ok(servers) if servers.is_empty() => println!("  none"),
        Ok(servers) => {
            for (name, server) in servers {
                println!("  {:<28} {} {}", name, server.command, server.args.join(" "));
            }
        }
        Err(e) => println!("  unreadable: {e}"),
    }
}
