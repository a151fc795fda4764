//! Vendor install scripts fetched with curl and piped to bash.

use anyhow::Result;

use super::{check_version, InstallContext, PackageManager};
use crate::process::{self, Cmd};

/// Pipeline run by `bash -c`; the URL arrives as `$0`, extra arguments as `$@`.
const PIPELINE: &str = r#"curl -fsSL "$0" | bash -s -- "$@""#;

#[derive(Debug, Clone)]
pub struct CurlScript {
    ctx: InstallContext,
    url: String,
}

impl CurlScript {
    pub fn new(ctx: InstallContext, url: impl Into<String>) -> Self {
        Self {
            ctx,
            url: url.into(),
        }
    }

    pub fn bash_args(url: &str, version: Option<&str>) -> Result<Vec<String>> {
        let mut args = vec![
            "-o".to_string(),
            "pipefail".to_string(),
            "-c".to_string(),
            PIPELINE.to_string(),
            url.to_string(),
        ];
        if let Some(v) = version {
            check_version(v)?;
            args.push(v.to_string());
        }
        Ok(args)
    }
}

impl PackageManager for CurlScript {
    fn name(&self) -> &str {
        "native binary"
    }

    fn is_available(&self) -> bool {
        process::exists_in("curl", &self.ctx.search_path)
            && process::exists_in("bash", &self.ctx.search_path)
    }

    fn required_tool(&self) -> &str {
        "curl"
    }

    /// `package` is informational here; the script decides what it installs.
    fn install(&self, package: &str, version: Option<&str>) -> Result<()> {
        let args = Self::bash_args(&self.url, version)?;
        tracing::info!("running {} for {}", self.url, self.ctx.username);
        Cmd::new("bash")
            .args(&args)
            .env("PATH", &self.ctx.search_path)
            .env("HOME", &self.ctx.home)
            .error_msg(format!("install script for '{package}' failed ({})", self.url))
            .run_interactive()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_and_version_are_positional() {
        let args = CurlScript::bash_args("https://claude.ai/install.sh", Some("1.0.42")).unwrap();
        assert_eq!(args[3], PIPELINE);
        assert_eq!(args[4], "https://claude.ai/install.sh");
        assert_eq!(args[5], "1.0.42");
    }

    #[test]
    fn test_rejects_injected_version() {
        assert!(CurlScript::bash_args("https://x", Some("1; rm -rf ~")).is_err());
    }
}
