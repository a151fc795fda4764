//! Python tool installs, preferring `uv` over `pip`.

use anyhow::{bail, Result};

use super::{check_version, split_packages, InstallContext, PackageManager};
use crate::process::{self, Cmd};

/// Which Python installer a [`Pip`] will drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipBackend {
    Uv,
    Pip3,
    Pip,
}

impl PipBackend {
    pub fn program(self) -> &'static str {
        match self {
            Self::Uv => "uv",
            Self::Pip3 => "pip3",
            Self::Pip => "pip",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pip {
    ctx: InstallContext,
}

impl Pip {
    pub fn new(ctx: InstallContext) -> Self {
        Self { ctx }
    }

    /// First available backend on the search path.
    pub fn backend(&self) -> Option<PipBackend> {
        [PipBackend::Uv, PipBackend::Pip3, PipBackend::Pip]
            .into_iter()
            .find(|b| process::exists_in(b.program(), &self.ctx.search_path))
    }

    pub fn install_args(
        backend: PipBackend,
        package: &str,
        version: Option<&str>,
    ) -> Result<Vec<String>> {
        let packages = split_packages(package);
        let Some((first, rest)) = packages.split_first() else {
            bail!("no python package given");
        };

        let pinned = match version {
            Some(v) => {
                check_version(v)?;
                format!("{first}=={v}")
            }
            None => (*first).to_string(),
        };

        let mut args: Vec<String> = match backend {
            PipBackend::Uv => vec!["tool".into(), "install".into(), pinned],
            PipBackend::Pip3 | PipBackend::Pip => {
                vec!["install".into(), "--user".into(), pinned]
            }
        };
        for extra in rest {
            match backend {
                PipBackend::Uv => {
                    args.push("--with".into());
                    args.push((*extra).to_string());
                }
                PipBackend::Pip3 | PipBackend::Pip => args.push((*extra).to_string()),
            }
        }
        Ok(args)
    }
}

impl PackageManager for Pip {
    fn name(&self) -> &str {
        "pip"
    }

    fn is_available(&self) -> bool {
        self.backend().is_some()
    }

    fn required_tool(&self) -> &str {
        "uv or pip"
    }

    fn install(&self, package: &str, version: Option<&str>) -> Result<()> {
        let Some(backend) = self.backend() else {
            bail!("neither uv nor pip is available");
        };
        let args = Self::install_args(backend, package, version)?;
        tracing::info!(
            "{}: installing {package} for {}",
            backend.program(),
            self.ctx.username
        );
        Cmd::new(backend.program())
            .args(&args)
            .env("PATH", &self.ctx.search_path)
            .env("HOME", &self.ctx.home)
            .error_msg(format!("{} install of '{package}' failed", backend.program()))
            .run_interactive()?;
        Ok(())
    }
}
