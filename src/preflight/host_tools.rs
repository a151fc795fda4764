//! Package manager availability checks.

use crate::process;

use super::types::CheckResult;

/// Check the tools install methods shell out to.
///
/// No single package manager is required on its own; a missing one only
/// disables the components that depend on it, so absence is a warning.
/// Having none of them at all is a failure.
pub fn check_host_tools(search_path: &str) -> Vec<CheckResult> {
    let tools = [
        ("npm", "Node.js", "npm-based components and fallbacks"),
        ("curl", "curl", "native binary install scripts"),
        ("bash", "bash", "native binary install scripts"),
        ("apt-get", "apt", "system packages (tmux)"),
        ("jq", "jq", "`register-mcp --jq`"),
    ];

    let mut results: Vec<CheckResult> = tools
        .iter()
        .map(|(tool, package, purpose)| check_tool(tool, package, purpose, search_path))
        .collect();

    let python = ["uv", "pip3", "pip"]
        .into_iter()
        .find_map(|tool| process::which_in(tool, search_path));
    results.push(match python {
        Some(path) => CheckResult::pass_with("python installer", &path.display().to_string()),
        None => CheckResult::warn(
            "python installer",
            "None of uv, pip3, pip found. Needed for pip-based components.",
        ),
    });

    let installers = ["npm", "apt-get", "curl", "uv", "pip3", "pip"];
    if !installers
        .iter()
        .any(|tool| process::exists_in(tool, search_path))
    {
        results.push(CheckResult::fail(
            "package managers",
            "No package manager found on the search path; nothing can be installed",
        ));
    }

    results
}

fn check_tool(tool: &str, package: &str, purpose: &str, search_path: &str) -> CheckResult {
    match process::which_in(tool, search_path) {
        Some(path) => CheckResult::pass_with(tool, &path.display().to_string()),
        None => CheckResult::warn(
            tool,
            &format!("Not found. Install '{package}'. Needed for {purpose}."),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preflight::CheckStatus;

    #[test]
    fn test_empty_search_path_fails() {
        let results = check_host_tools("/nonexistent-featkit-dir");
        assert!(results.iter().any(|c| c.status == CheckStatus::Fail));
        assert!(results
            .iter()
            .filter(|c| c.name != "package managers")
            .all(|c| c.status == CheckStatus::Warn));
    }
}
