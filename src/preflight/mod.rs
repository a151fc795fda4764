//! Preflight checks for feature installs.
//!
//! Validates that package managers and the state directory are usable
//! before anything is installed. Run with `featkit preflight`.

mod environment;
mod host_tools;
mod types;

use anyhow::{bail, Result};

pub use types::{CheckResult, CheckStatus, PreflightReport};

use crate::config::Config;
use crate::platform::PlatformInfo;

/// Run all preflight checks.
pub fn run_preflight(config: &Config, platform: &PlatformInfo) -> PreflightReport {
    let mut checks = Vec::new();

    tracing::info!("checking package managers");
    checks.extend(host_tools::check_host_tools(&config.search_path));

    tracing::info!("checking install environment");
    checks.extend(environment::check_environment(config, platform));

    PreflightReport { checks }
}

/// Run preflight and bail if any checks fail.
pub fn run_preflight_or_fail(config: &Config, platform: &PlatformInfo) -> Result<()> {
    let report = run_preflight(config, platform);
    report.print();

    if !report.all_passed() {
        bail!(
            "Preflight failed: {} check(s) failed. Fix the issues above before installing.",
            report.fail_count()
        );
    }

    println!("All preflight checks passed!\n");
    Ok(())
}
