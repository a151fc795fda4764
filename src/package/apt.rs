//! Debian packages via apt-get.

use std::cell::Cell;

use anyhow::{bail, Result};

use super::{check_version, split_packages, InstallContext, PackageManager};
use crate::process::{self, Cmd};

#[derive(Debug, Clone)]
pub struct Apt {
    ctx: InstallContext,
    /// Package lists are refreshed once per instance.
    updated: Cell<bool>,
}

impl Apt {
    pub fn new(ctx: InstallContext) -> Self {
        Self {
            ctx,
            updated: Cell::new(false),
        }
    }

    pub fn install_args(package: &str, version: Option<&str>) -> Result<Vec<String>> {
        let packages = split_packages(package);
        let Some((first, rest)) = packages.split_first() else {
            bail!("no apt package given");
        };

        let mut args: Vec<String> = ["install", "-y", "--no-install-recommends"]
            .into_iter()
            .map(String::from)
            .collect();
        match version {
            Some(v) => {
                check_version(v)?;
                args.push(format!("{first}={v}"));
            }
            None => args.push((*first).to_string()),
        }
        args.extend(rest.iter().map(|p| (*p).to_string()));
        Ok(args)
    }

    fn apt_get(&self) -> Cmd {
        Cmd::new("apt-get")
            .env("DEBIAN_FRONTEND", "noninteractive")
            .env("PATH", &self.ctx.search_path)
    }
}

impl PackageManager for Apt {
    fn name(&self) -> &str {
        "apt"
    }

    fn is_available(&self) -> bool {
        process::exists_in("apt-get", &self.ctx.search_path)
    }

    fn required_tool(&self) -> &str {
        "apt-get"
    }

    fn install(&self, package: &str, version: Option<&str>) -> Result<()> {
        if !self.updated.get() {
            self.apt_get()
                .arg("update")
                .error_msg("apt-get update failed")
                .run_interactive()?;
            self.updated.set(true);
        }

        let args = Self::install_args(package, version)?;
        self.apt_get()
            .args(&args)
            .error_msg(format!("apt-get install of '{package}' failed"))
            .run_interactive()?;
        Ok(())
    }
}
