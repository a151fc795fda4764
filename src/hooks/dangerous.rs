//! Blocks destructive shell commands.

use std::sync::LazyLock;

use regex::Regex;

use super::{HookInput, Verdict};

const PATTERNS: &[(&str, &str)] = &[
    (
        r"\brm\s+.*-[^\s]*r[^\s]*f[^\s]*\s+[/~](?:\s|$)",
        "Blocked: rm -rf on root or home directory",
    ),
    (
        r"\brm\s+.*-[^\s]*f[^\s]*r[^\s]*\s+[/~](?:\s|$)",
        "Blocked: rm -rf on root or home directory",
    ),
    (r"\brm\s+-rf\s+/(?:\s|$)", "Blocked: rm -rf /"),
    (r"\brm\s+-rf\s+~(?:\s|$)", "Blocked: rm -rf ~"),
    (
        r"\bsudo\s+rm\b",
        "Blocked: sudo rm - use caution with privileged deletion",
    ),
    (
        r"\bchmod\s+777\b",
        "Blocked: chmod 777 creates security vulnerability",
    ),
    (
        r"\bchmod\s+-R\s+777\b",
        "Blocked: recursive chmod 777 creates security vulnerability",
    ),
    (
        r"\bgit\s+push\s+.*--force.*\s+(origin\s+)?(main|master)\b",
        "Blocked: force push to main/master destroys history",
    ),
    (
        r"\bgit\s+push\s+.*-f\s+.*\s+(origin\s+)?(main|master)\b",
        "Blocked: force push to main/master destroys history",
    ),
    (
        r"\bgit\s+push\s+-f\s+(origin\s+)?(main|master)\b",
        "Blocked: force push to main/master destroys history",
    ),
    (
        r"\bgit\s+push\s+--force\s+(origin\s+)?(main|master)\b",
        "Blocked: force push to main/master destroys history",
    ),
    (r">\s*/usr/", "Blocked: writing to /usr system directory"),
    (r">\s*/etc/", "Blocked: writing to /etc system directory"),
    (r">\s*/bin/", "Blocked: writing to /bin system directory"),
    (r">\s*/sbin/", "Blocked: writing to /sbin system directory"),
    (r"\bmkfs\.\w+", "Blocked: disk formatting command"),
    (r"\bdd\s+.*of=/dev/", "Blocked: dd writing to device"),
    (
        r"\bgit\s+reset\s+--hard\s+origin/(main|master)\b",
        "Blocked: hard reset to remote main/master - destructive operation",
    ),
];

static RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    PATTERNS
        .iter()
        .filter_map(|(pattern, message)| match Regex::new(&format!("(?i){pattern}")) {
            Ok(re) => Some((re, *message)),
            Err(e) => {
                tracing::error!("invalid dangerous-command pattern {pattern}: {e}");
                None
            }
        })
        .collect()
});

/// First matching block reason for `command`, if any.
pub fn check_command(command: &str) -> Option<&'static str> {
    RULES
        .iter()
        .find(|(re, _)| re.is_match(command))
        .map(|(_, message)| *message)
}

pub fn evaluate(input: &HookInput) -> Verdict {
    let command = input.field("command");
    if command.is_empty() {
        return Verdict::Allow;
    }
    match check_command(command) {
        Some(message) => Verdict::Block(message.to_string()),
        None => Verdict::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(RULES.len(), PATTERNS.len());
    }

    #[test]
    fn test_blocks_destructive_commands() {
        for command in [
            "rm -rf /",
            "rm -rf ~",
            "rm -fr /",
            "cd /tmp && rm -rf / ",
            "sudo rm -f /var/log/syslog",
            "chmod 777 app.sh",
            "chmod -R 777 .",
            "git push --force origin main",
            "git push -f origin master",
            "git push origin main --force-with-lease && git push --force origin master",
            "echo x > /etc/hosts",
            "cat foo >/usr/bin/ls",
            "mkfs.ext4 /dev/sda1",
            "dd if=/dev/zero of=/dev/sda bs=1M",
            "git reset --hard origin/main",
            "RM -RF /",
        ] {
            assert!(check_command(command).is_some(), "allowed: {command}");
        }
    }

    #[test]
    fn test_allows_ordinary_commands() {
        for command in [
            "rm -rf ./target",
            "rm -rf /tmp/build",
            "ls -la /etc",
            "git push origin feature-branch",
            "git push --force origin feature/main-menu",
            "chmod 755 script.sh",
            "cargo test",
            "git reset --hard HEAD~1",
        ] {
            assert!(check_command(command).is_none(), "blocked: {command}");
        }
    }

    #[test]
    fn test_evaluate_reads_command_field() {
        let input: HookInput =
            serde_json::from_str(r#"{"tool_input": {"command": "rm -rf /"}}"#).unwrap();
        assert_eq!(
            evaluate(&input),
            Verdict::Block("Blocked: rm -rf on root or home directory".into())
        );
        assert_eq!(evaluate(&HookInput::default()), Verdict::Allow);
    }
}
