//! Global npm installs.

use anyhow::{bail, Result};

use super::{check_version, split_packages, InstallContext, PackageManager};
use crate::process::{self, Cmd};

#[derive(Debug, Clone)]
pub struct Npm {
    ctx: InstallContext,
}

impl Npm {
    pub fn new(ctx: InstallContext) -> Self {
        Self { ctx }
    }

    /// Arguments for `npm`, e.g. `install -g pkg@1.2.3 other`.
    pub fn install_args(package: &str, version: Option<&str>) -> Result<Vec<String>> {
        let packages = split_packages(package);
        let Some((first, rest)) = packages.split_first() else {
            bail!("no npm package given");
        };

        let mut args = vec!["install".to_string(), "-g".to_string()];
        match version {
            Some(v) => {
                check_version(v)?;
                args.push(format!("{first}@{v}"));
            }
            None => args.push((*first).to_string()),
        }
        args.extend(rest.iter().map(|p| (*p).to_string()));
        Ok(args)
    }
}

impl PackageManager for Npm {
    fn name(&self) -> &str {
        "npm"
    }

    fn is_available(&self) -> bool {
        process::exists_in("npm", &self.ctx.search_path)
    }

    fn required_tool(&self) -> &str {
        "npm"
    }

    fn install(&self, package: &str, version: Option<&str>) -> Result<()> {
        let args = Self::install_args(package, version)?;
        tracing::info!("npm: installing {package} for {}", self.ctx.username);
        Cmd::new("npm")
            .args(&args)
            .env("PATH", &self.ctx.search_path)
            .env("HOME", &self.ctx.home)
            .error_msg(format!("npm install of '{package}' failed"))
            .run_interactive()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_args_latest() {
        let args = Npm::install_args("@anthropic-ai/claude-code", None).unwrap();
        assert_eq!(args, vec!["install", "-g", "@anthropic-ai/claude-code"]);
    }

    #[test]
    fn test_install_args_pinned_first_package_only() {
        let args =
            Npm::install_args("typescript-language-server typescript", Some("4.3.3")).unwrap();
        assert_eq!(
            args,
            vec!["install", "-g", "typescript-language-server@4.3.3", "typescript"]
        );
    }

    #[test]
    fn test_install_args_rejects_empty_and_bad_version() {
        assert!(Npm::install_args("  ", None).is_err());
        assert!(Npm::install_args("ccusage", Some("1 && curl evil")).is_err());
    }
}
