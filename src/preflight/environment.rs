//! Install environment checks (state directory, target user).

use std::fs;

use crate::config::Config;
use crate::platform::PlatformInfo;

use super::types::CheckResult;

pub fn check_environment(config: &Config, platform: &PlatformInfo) -> Vec<CheckResult> {
    let mut results = Vec::new();

    // Create, then write a test file: a directory that exists but is read-only still fails.
    let state_dir = &config.state_dir;
    let test_file = state_dir.join(".preflight-test");
    let writable = fs::create_dir_all(state_dir).and_then(|()| fs::write(&test_file, "test"));
    match writable {
        Ok(()) => {
            let _ = fs::remove_file(&test_file);
            results.push(CheckResult::pass_with(
                "state directory",
                &state_dir.display().to_string(),
            ));
        }
        Err(e) => results.push(CheckResult::fail(
            "state directory",
            &format!("Cannot write to {}: {e}", state_dir.display()),
        )),
    }

    if platform.home.is_dir() {
        results.push(CheckResult::pass_with(
            "target user",
            &format!("{} ({})", platform.username, platform.home.display()),
        ));
    } else {
        results.push(CheckResult::warn(
            "target user",
            &format!(
                "{}: home directory {} does not exist",
                platform.username,
                platform.home.display()
            ),
        ));
    }

    if config.username != "automatic"
        && config.username != "auto"
        && config.username != "none"
        && config.username != platform.username
    {
        results.push(CheckResult::warn(
            "USERNAME",
            &format!(
                "requested '{}' not found, using '{}'",
                config.username, platform.username
            ),
        ));
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preflight::CheckStatus;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn platform(home: PathBuf) -> PlatformInfo {
        PlatformInfo {
            username: "node".into(),
            uid: 1000,
            gid: 1000,
            home,
            arch: "x86_64".into(),
        }
    }

    #[test]
    fn test_writable_state_dir_and_home() {
        let dir = TempDir::new().unwrap();
        let mut vars = HashMap::new();
        vars.insert(
            "FEATKIT_STATE_DIR".to_string(),
            dir.path().join("state").display().to_string(),
        );
        let config = Config::from_vars(&vars);

        let results = check_environment(&config, &platform(dir.path().to_path_buf()));
        assert!(results.iter().all(|c| c.status == CheckStatus::Pass));
        assert!(!dir.path().join("state/.preflight-test").exists());
    }

    #[test]
    fn test_missing_home_warns_and_unknown_user_warns() {
        let dir = TempDir::new().unwrap();
        let mut vars = HashMap::new();
        vars.insert(
            "FEATKIT_STATE_DIR".to_string(),
            dir.path().display().to_string(),
        );
        vars.insert("USERNAME".to_string(), "ghost".to_string());
        let config = Config::from_vars(&vars);

        let results = check_environment(&config, &platform(dir.path().join("missing")));
        assert_eq!(
            results
                .iter()
                .filter(|c| c.status == CheckStatus::Warn)
                .count(),
            2
        );
    }
}
