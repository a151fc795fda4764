//! Declarative catalog of installable components.
//!
//! Components are static data describing WHAT to install: the binary that
//! proves the install worked, a primary method and an optional fallback.
//! The installer decides HOW.
//!
//! ```text
//! CLAUDE_CODE = Component {            Installer
//!   binary: "claude",                  ─────────
//!   primary: script(INSTALL_SH),  →    retry primary, verify,
//!   fallback: npm("@anthropic-..."),   retry fallback, verify,
//! }                                    write marker
//! ```

pub mod definitions;

use std::fmt;

use crate::error::InstallError;
use crate::installer::{InstallPlan, InstallStep};
use crate::package::{Apt, CurlScript, InstallContext, Npm, PackageManager, Pip};
use crate::verify::default_fallback_paths;

pub use definitions::ALL_COMPONENTS;

/// How a method installs its package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Npm,
    Pip,
    Apt,
    /// Vendor install script at the given URL.
    Script(&'static str),
}

/// One install method: a package manager plus what to ask it for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Method {
    pub kind: MethodKind,
    pub package: &'static str,
}

impl Method {
    /// Instantiate the package manager behind this method.
    pub fn manager(&self, ctx: &InstallContext) -> Box<dyn PackageManager> {
        match self.kind {
            MethodKind::Npm => Box::new(Npm::new(ctx.clone())),
            MethodKind::Pip => Box::new(Pip::new(ctx.clone())),
            MethodKind::Apt => Box::new(Apt::new(ctx.clone())),
            MethodKind::Script(url) => Box::new(CurlScript::new(ctx.clone(), url)),
        }
    }

    fn step(&self, ctx: &InstallContext) -> InstallStep {
        InstallStep::new(self.manager(ctx), self.package)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MethodKind::Npm => write!(f, "npm {}", self.package),
            MethodKind::Pip => write!(f, "pip {}", self.package),
            MethodKind::Apt => write!(f, "apt {}", self.package),
            MethodKind::Script(url) => write!(f, "script {url}"),
        }
    }
}

/// A static component definition.
#[derive(Debug, Clone, Copy)]
pub struct Component {
    pub name: &'static str,
    /// Executable whose presence proves the install.
    pub binary: &'static str,
    pub description: &'static str,
    pub primary: Method,
    pub fallback: Option<Method>,
}

impl Component {
    /// Build an executable plan against the target environment.
    pub fn plan(&self, ctx: &InstallContext) -> InstallPlan {
        InstallPlan {
            component: self.name.to_string(),
            binary: self.binary.to_string(),
            fallback_paths: default_fallback_paths(&ctx.home, self.binary),
            primary: self.primary.step(ctx),
            fallback: self.fallback.map(|m| m.step(ctx)),
        }
    }
}

/// Look up a component definition by name.
pub fn find(name: &str) -> Option<&'static Component> {
    ALL_COMPONENTS.iter().copied().find(|c| c.name == name)
}

/// Check that `name` is usable as a component identifier (and marker file stem).
pub fn validate_name(name: &str) -> Result<(), InstallError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(InstallError::InvalidComponent(name.to_string()))
    }
}

// =============================================================================
// Helpers for definitions
// =============================================================================

pub const fn npm(package: &'static str) -> Method {
    Method {
        kind: MethodKind::Npm,
        package,
    }
}

pub const fn pip(package: &'static str) -> Method {
    Method {
        kind: MethodKind::Pip,
        package,
    }
}

pub const fn apt(package: &'static str) -> Method {
    Method {
        kind: MethodKind::Apt,
        package,
    }
}

pub const fn script(url: &'static str, package: &'static str) -> Method {
    Method {
        kind: MethodKind::Script(url),
        package,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("claude-code").is_ok());
        assert!(validate_name("typescript_language.server").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("../etc/passwd").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name(".hidden").is_err());
        assert!(validate_name("with space").is_err());
    }

    #[test]
    fn test_find() {
        assert_eq!(find("claude-code").map(|c| c.binary), Some("claude"));
        assert!(find("nope").is_none());
    }

    #[test]
    fn test_plan_uses_home_fallback_paths() {
        let ctx = InstallContext {
            search_path: "/usr/bin".into(),
            home: PathBuf::from("/home/node"),
            username: "node".into(),
        };
        let plan = find("claude-code").unwrap().plan(&ctx);
        assert_eq!(plan.component, "claude-code");
        assert_eq!(plan.primary.manager.name(), "native binary");
        assert_eq!(plan.fallback.as_ref().map(|s| s.manager.name()), Some("npm"));
        assert!(plan
            .fallback_paths
            .contains(&PathBuf::from("/home/node/.local/bin/claude")));
    }
}
