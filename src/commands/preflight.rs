//! Preflight command - runs preflight checks.

use anyhow::Result;

use crate::config::Config;
use crate::platform::PlatformInfo;
use crate::preflight;

/// Execute the preflight command.
pub fn cmd_preflight(config: &Config, platform: &PlatformInfo, strict: bool) -> Result<()> {
    if strict {
        preflight::run_preflight_or_fail(config, platform)?;
    } else {
        let report = preflight::run_preflight(config, platform);
        report.print();
        if !report.all_passed() {
            println!("Some checks failed. Use --strict to fail the build.");
        }
    }
    Ok(())
}
