//! Install command - ensures each named component is installed.

use anyhow::{bail, Result};

use crate::config::Config;
use crate::installer::Installer;
use crate::platform::PlatformInfo;
use crate::timing::Timer;

/// One component to install and the release it is pinned to, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub component: String,
    pub version: Option<String>,
}

/// Parse `name` or `name@version` arguments.
///
/// `VERSION` only pins a lone component given without its own `@version`;
/// a pinned `VERSION` with several components is refused, since one
/// release number cannot apply to different tools.
pub fn parse_requests(args: &[String], pinned: Option<&str>) -> Result<Vec<InstallRequest>> {
    if let Some(version) = pinned {
        if args.len() > 1 {
            bail!(
                "VERSION={version} is ambiguous with {} components; pin each one as name@version",
                args.len()
            );
        }
    }

    args.iter()
        .map(|arg| match arg.split_once('@') {
            Some((name, version)) => {
                if version.trim().is_empty() {
                    bail!("'{arg}': empty version after '@'");
                }
                Ok(InstallRequest {
                    component: name.to_string(),
                    version: Some(version.trim().to_string()),
                })
            }
            None => Ok(InstallRequest {
                component: arg.clone(),
                version: pinned.map(str::to_string),
            }),
        })
        .collect()
}

/// Execute the install command. Stops at the first component that fails.
pub fn cmd_install(config: &Config, platform: &PlatformInfo, components: &[String]) -> Result<()> {
    let requests = parse_requests(components, config.pinned_version())?;
    let installer = Installer::from_config(config, platform);

    for request in &requests {
        let name = &request.component;
        let timer = Timer::start(&format!("install {name}"));
        let outcome = installer.ensure_version(name, request.version.as_deref())?;
        timer.finish();
        println!("{outcome}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_version_applies_to_single_component() {
        let requests = parse_requests(&args(&["claude-code"]), Some("1.0.42")).unwrap();
        assert_eq!(
            requests,
            vec![InstallRequest {
                component: "claude-code".into(),
                version: Some("1.0.42".into()),
            }]
        );
    }

    #[test]
    fn test_version_with_several_components_is_refused() {
        let err = parse_requests(&args(&["claude-code", "tmux"]), Some("1.0.42")).unwrap_err();
        assert!(err.to_string().contains("name@version"));

        // Unpinned VERSION (latest) is fine for any number of components.
        let requests = parse_requests(&args(&["claude-code", "tmux"]), None).unwrap();
        assert!(requests.iter().all(|r| r.version.is_none()));
    }

    #[test]
    fn test_per_component_pin() {
        let requests = parse_requests(&args(&["claude-code@1.0.42", "tmux"]), None).unwrap();
        assert_eq!(requests[0].component, "claude-code");
        assert_eq!(requests[0].version.as_deref(), Some("1.0.42"));
        assert_eq!(requests[1].component, "tmux");
        assert_eq!(requests[1].version, None);
    }

    #[test]
    fn test_explicit_pin_wins_over_version() {
        let requests = parse_requests(&args(&["ccusage@2.0.0"]), Some("1.0.0")).unwrap();
        assert_eq!(requests[0].version.as_deref(), Some("2.0.0"));
    }

    #[test]
    fn test_empty_pin_is_rejected() {
        assert!(parse_requests(&args(&["ccusage@"]), None).is_err());
        assert!(parse_requests(&args(&["ccusage@ "]), None).is_err());
    }
}
