//! Blocks edits to secrets, credentials, lock files and VCS internals.

use std::sync::LazyLock;

use regex::Regex;

use super::{HookInput, Verdict};

const PATTERNS: &[(&str, &str)] = &[
    (r"(^|/)\.env$", "Blocked: .env contains secrets - edit manually if needed"),
    (
        r"(^|/)\.env\.[^/]+$",
        "Blocked: .env.* files contain secrets - edit manually if needed",
    ),
    (r"(^|/)\.git/", "Blocked: .git/ directory is managed by git"),
    (
        r"(^|/)package-lock\.json$",
        "Blocked: package-lock.json - use npm install instead",
    ),
    (r"(^|/)yarn\.lock$", "Blocked: yarn.lock - use yarn install instead"),
    (
        r"(^|/)pnpm-lock\.yaml$",
        "Blocked: pnpm-lock.yaml - use pnpm install instead",
    ),
    (
        r"(^|/)Gemfile\.lock$",
        "Blocked: Gemfile.lock - use bundle install instead",
    ),
    (
        r"(^|/)poetry\.lock$",
        "Blocked: poetry.lock - use poetry install instead",
    ),
    (r"(^|/)Cargo\.lock$", "Blocked: Cargo.lock - use cargo build instead"),
    (
        r"(^|/)composer\.lock$",
        "Blocked: composer.lock - use composer install instead",
    ),
    (r"(^|/)uv\.lock$", "Blocked: uv.lock - use uv sync instead"),
    (
        r"\.pem$",
        "Blocked: .pem files contain sensitive cryptographic material",
    ),
    (
        r"\.key$",
        "Blocked: .key files contain sensitive cryptographic material",
    ),
    (
        r"\.crt$",
        "Blocked: .crt certificate files should not be edited directly",
    ),
    (
        r"\.p12$",
        "Blocked: .p12 files contain sensitive cryptographic material",
    ),
    (
        r"\.pfx$",
        "Blocked: .pfx files contain sensitive cryptographic material",
    ),
    (
        r"(^|/)credentials\.json$",
        "Blocked: credentials.json contains secrets",
    ),
    (r"(^|/)secrets\.yaml$", "Blocked: secrets.yaml contains secrets"),
    (r"(^|/)secrets\.yml$", "Blocked: secrets.yml contains secrets"),
    (r"(^|/)secrets\.json$", "Blocked: secrets.json contains secrets"),
    (r"(^|/)\.secrets$", "Blocked: .secrets file contains secrets"),
    (
        r"(^|/)\.ssh/",
        "Blocked: .ssh/ contains sensitive authentication data",
    ),
    (r"(^|/)\.aws/", "Blocked: .aws/ contains AWS credentials"),
    (
        r"(^|/)\.netrc$",
        "Blocked: .netrc contains authentication credentials",
    ),
    (
        r"(^|/)\.npmrc$",
        "Blocked: .npmrc may contain auth tokens - edit manually if needed",
    ),
    (r"(^|/)\.pypirc$", "Blocked: .pypirc contains PyPI credentials"),
    (r"(^|/|-)id_rsa($|\.)", "Blocked: SSH private key file"),
    (r"(^|/)id_ed25519", "Blocked: SSH private key file"),
    (r"(^|/)id_ecdsa", "Blocked: SSH private key file"),
];

static RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    PATTERNS
        .iter()
        .filter_map(|(pattern, message)| match Regex::new(&format!("(?i){pattern}")) {
            Ok(re) => Some((re, *message)),
            Err(e) => {
                tracing::error!("invalid protected-file pattern {pattern}: {e}");
                None
            }
        })
        .collect()
});

/// Block reason for `file_path`, if it is protected. Windows separators are
/// normalized first.
pub fn check_path(file_path: &str) -> Option<&'static str> {
    let normalized = file_path.replace('\\', "/");
    RULES
        .iter()
        .find(|(re, _)| re.is_match(&normalized))
        .map(|(_, message)| *message)
}

pub fn evaluate(input: &HookInput) -> Verdict {
    let path = input.field("file_path");
    if path.is_empty() {
        return Verdict::Allow;
    }
    match check_path(path) {
        Some(message) => Verdict::Block(message.to_string()),
        None => Verdict::Allow,
    }
}
