//! Keeps shell commands of read-only agents read-only.
//!
//! Two modes:
//! - `general-readonly` blocks known write commands and prefixes.
//! - `git-readonly` allows only read-only git subcommands plus an allowlist
//!   of inspection utilities.
//!
//! Commands are split on newlines, `;`, `&&`, `||`, `&` and `|` without quote
//! awareness, so quoted separators over-split. Command substitutions are
//! checked recursively; path and backslash prefixes (`/usr/bin/rm`, `\rm`)
//! and `command`/`builtin` wrappers are stripped before lookup.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use super::{HookInput, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadonlyMode {
    #[default]
    General,
    Git,
}

impl ReadonlyMode {
    pub fn name(self) -> &'static str {
        match self {
            Self::General => "general-readonly",
            Self::Git => "git-readonly",
        }
    }
}

impl fmt::Display for ReadonlyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReadonlyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::General, Self::Git]
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| format!("unknown mode '{s}' (general-readonly or git-readonly)"))
    }
}

// =============================================================================
// general-readonly blocklist
// =============================================================================

const WRITE_COMMANDS: &[&str] = &[
    // filesystem
    "rm", "mv", "cp", "mkdir", "rmdir", "touch", "chmod", "chown", "chgrp", "ln", "install",
    "mkfifo", "mknod", "truncate", "shred", "unlink",
    // editors
    "nano", "vi", "vim", "nvim",
    // processes
    "kill", "pkill", "killall",
    "dd", "sudo", "su", "tee",
    // run arbitrary code
    "eval", "exec", "source", "xargs",
];

const WRITE_PREFIXES: &[&str] = &[
    "docker stop",
    "docker rm",
    "docker kill",
    "docker rmi",
    "docker exec",
    "docker-compose down",
    "docker compose down",
    "git push",
    "git reset",
    "git clean",
    "git merge",
    "git rebase",
    "git commit",
    "git cherry-pick",
    "git revert",
    "git pull",
    "git checkout --",
    "git restore",
    "git stash drop",
    "git stash clear",
    "git stash pop",
    "git config",
    "git remote add",
    "git remote remove",
    "git remote rename",
    "git branch -d",
    "git branch -D",
    "git branch --delete",
    "git branch -m",
    "git branch -M",
    "git branch --move",
    "git tag -d",
    "git tag --delete",
    "pip install",
    "pip uninstall",
    "pip3 install",
    "pip3 uninstall",
    "uv pip",
    "npm install",
    "npm uninstall",
    "npm ci",
    "npm update",
    "npm link",
    "yarn add",
    "yarn remove",
    "yarn install",
    "pnpm add",
    "pnpm remove",
    "pnpm install",
    "apt install",
    "apt-get install",
    "apt remove",
    "apt-get remove",
    "cargo install",
    "sed -i",
    "sed --in-place",
];

const INTERPRETERS: &[&str] = &[
    "bash", "sh", "zsh", "dash", "ksh", "fish", "python", "python3", "node", "perl", "ruby",
];

/// Interpreter and the flag that runs an inline script.
const INLINE_FLAGS: &[(&str, &str)] = &[
    ("python", "-c"),
    ("python3", "-c"),
    ("node", "-e"),
    ("perl", "-e"),
    ("ruby", "-e"),
    ("bash", "-c"),
    ("sh", "-c"),
    ("zsh", "-c"),
];

// =============================================================================
// git-readonly allowlist
// =============================================================================

const GIT_SAFE_SUBCOMMANDS: &[&str] = &[
    "log", "blame", "show", "diff", "bisect", "reflog", "shortlog", "rev-parse", "rev-list",
    "branch", "tag", "remote", "status", "ls-files", "ls-tree", "cat-file", "describe",
    "name-rev", "grep", "for-each-ref", "count-objects", "fsck", "verify-commit", "verify-tag",
    "fetch", "stash", "notes", "worktree", "config", "help", "version",
];

/// Arguments that turn an otherwise safe subcommand into a write.
const GIT_RESTRICTED_ARGS: &[(&str, &[&str])] = &[
    ("branch", &["-d", "-D", "-m", "-M", "--delete", "--move", "--copy", "-c", "-C"]),
    ("tag", &["-d", "--delete", "-f", "--force"]),
    ("remote", &["add", "remove", "rename", "set-url", "set-head", "prune"]),
    ("worktree", &["add", "remove", "prune", "repair", "move", "lock", "unlock"]),
    ("notes", &["add", "append", "copy", "edit", "merge", "prune", "remove"]),
];

/// `git config` is allowed only with one of these.
const GIT_CONFIG_READ_FLAGS: &[&str] = &["--get", "--get-all", "--list", "-l", "--get-regexp"];

/// Git global options that consume the next word.
const GIT_OPTIONS_WITH_VALUE: &[&str] = &["-C", "-c", "--git-dir", "--work-tree"];

const READONLY_UTILITIES: &[&str] = &[
    // reading
    "cat", "head", "tail", "less", "more", "bat",
    // text processing (sed checked for -i separately)
    "wc", "sort", "uniq", "cut", "tr", "paste", "column", "fold", "sed", "awk", "gawk",
    // search
    "grep", "egrep", "fgrep", "rg", "ag", "ack",
    // listing
    "find", "ls", "tree", "file", "stat", "du", "df",
    "echo", "printf",
    "diff", "comm", "cmp",
    "jq", "yq",
    "basename", "dirname", "realpath", "readlink",
    // system info
    "date", "cal", "env", "printenv", "id", "whoami", "uname", "hostname", "pwd", "uptime",
    "nproc", "arch",
    "true", "false", "test", "[",
    "which", "type", "command",
    "seq", "expr", "bc",
    "tput", "clear",
    "md5sum", "sha256sum", "sha1sum",
    "xxd", "od", "hexdump", "strings",
    "curl", "ssh",
    "ast-grep", "sg",
];

static DEV_NULL_REDIRECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[12]?>{1,2}\s*/dev/null").expect("valid /dev/null regex"));

static FILE_REDIRECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s)])[12]?>{1,2}\s*[^\s&|;]").expect("valid redirect regex"));

static DOLLAR_SUBSTITUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\(([^)]+)\)").expect("valid substitution regex"));

static BACKTICK_SUBSTITUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid backtick regex"));

// =============================================================================
// Command parsing
// =============================================================================

/// Split on newlines, `;`, `&&`, `||` and a lone `&`. Line continuations
/// are joined first; `&` right after a redirect (`2>&1`) is not a separator.
fn split_segments(command: &str) -> Vec<String> {
    let command = command.replace("\\\n", " ");
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = command.chars().peekable();

    while let Some(c) = chars.next() {
        let separator = match c {
            ';' | '\n' => true,
            '&' if current.ends_with('>') || current.ends_with('<') => false,
            '&' => {
                if chars.peek() == Some(&'&') {
                    chars.next();
                }
                true
            }
            '|' if chars.peek() == Some(&'|') => {
                chars.next();
                true
            }
            _ => false,
        };
        if separator {
            segments.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    segments.push(current);

    segments
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Pipe stages of a segment (`||` is already split off).
fn split_pipes(segment: &str) -> Vec<&str> {
    segment
        .split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Words of a stage, minus leading `VAR=value` assignments.
fn command_words(stage: &str) -> Vec<&str> {
    stage
        .split_whitespace()
        .skip_while(|w| w.contains('=') && !w.starts_with('-'))
        .collect()
}

/// `/usr/bin/rm` and `\rm` both become `rm`.
fn base_name(word: &str) -> &str {
    let word = word.trim_start_matches('\\');
    word.rsplit('/').next().unwrap_or(word)
}

/// Look through `command` and `builtin` wrappers (and their flags).
fn resolve_wrapper<'a>(words: &[&'a str]) -> Option<(&'a str, Vec<&'a str>)> {
    let first = base_name(*words.first()?);
    if first == "command" || first == "builtin" {
        let rest: Vec<&str> = words[1..]
            .iter()
            .copied()
            .skip_while(|w| w.starts_with('-'))
            .collect();
        let base = base_name(*rest.first()?);
        return Some((base, rest));
    }
    Some((first, words.to_vec()))
}

fn has_redirect(command: &str) -> bool {
    let cleaned = DEV_NULL_REDIRECT.replace_all(command, "");
    FILE_REDIRECT.is_match(&cleaned)
}

fn substitutions(command: &str) -> Vec<&str> {
    DOLLAR_SUBSTITUTION
        .captures_iter(command)
        .chain(BACKTICK_SUBSTITUTION.captures_iter(command))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

fn has_sed_inplace(words: &[&str]) -> bool {
    words.iter().skip(1).any(|w| {
        *w == "--in-place"
            || w.starts_with("-i")
            || (w.starts_with('-') && !w.starts_with("--") && w.contains('i'))
    })
}

fn matches_prefix(words: &[&str], prefix: &str) -> bool {
    let prefix: Vec<&str> = prefix.split_whitespace().collect();
    words.len() >= prefix.len() && words[..prefix.len()] == prefix[..]
}

/// Every resolved `(stage index, base, words)` of a command.
fn stages(command: &str) -> Vec<(usize, String, Vec<String>)> {
    let mut out = Vec::new();
    for segment in split_segments(command) {
        for (index, stage) in split_pipes(&segment).into_iter().enumerate() {
            let words = command_words(stage);
            if let Some((base, words)) = resolve_wrapper(&words) {
                if !base.is_empty() {
                    out.push((
                        index,
                        base.to_string(),
                        words.iter().map(|w| (*w).to_string()).collect(),
                    ));
                }
            }
        }
    }
    out
}

// =============================================================================
// Mode checks
// =============================================================================

/// Block reason under `general-readonly`, if any.
pub fn check_general(command: &str) -> Option<String> {
    if has_redirect(command) {
        return Some(
            "Blocked: output redirection (> or >>) is not allowed in read-only mode".to_string(),
        );
    }

    if substitutions(command)
        .into_iter()
        .any(|inner| check_general(inner).is_some())
    {
        return Some("Blocked: command substitution contains a write operation".to_string());
    }

    for (index, base, words) in stages(command) {
        if WRITE_COMMANDS.contains(&base.as_str()) {
            return Some(format!("Blocked: '{base}' is not allowed in read-only mode"));
        }

        let mut resolved: Vec<&str> = vec![base.as_str()];
        resolved.extend(words.iter().skip(1).map(String::as_str));
        if let Some(prefix) = WRITE_PREFIXES.iter().find(|p| matches_prefix(&resolved, p)) {
            return Some(format!("Blocked: '{prefix}' is not allowed in read-only mode"));
        }

        if index > 0 && INTERPRETERS.contains(&base.as_str()) {
            return Some(format!(
                "Blocked: piping into '{base}' is not allowed in read-only mode"
            ));
        }

        if let Some((_, flag)) = INLINE_FLAGS.iter().find(|(name, _)| *name == base) {
            if words.iter().skip(1).any(|w| w.as_str() == *flag) {
                return Some(format!(
                    "Blocked: '{base} {flag}' inline execution is not allowed in read-only mode"
                ));
            }
        }
    }

    None
}

/// Block reason under `git-readonly`, if any.
pub fn check_git(command: &str) -> Option<String> {
    if has_redirect(command) {
        return Some("Blocked: output redirection is not allowed in read-only mode".to_string());
    }

    if substitutions(command)
        .into_iter()
        .any(|inner| check_git(inner).is_some())
    {
        return Some("Blocked: command substitution contains a blocked operation".to_string());
    }

    for (_, base, words) in stages(command) {
        if base == "git" {
            if let Some(reason) = check_git_words(&words) {
                return Some(reason);
            }
        } else if READONLY_UTILITIES.contains(&base.as_str()) {
            let words: Vec<&str> = words.iter().map(String::as_str).collect();
            if base == "sed" && has_sed_inplace(&words) {
                return Some(
                    "Blocked: 'sed -i' (in-place edit) is not allowed in read-only mode"
                        .to_string(),
                );
            }
        } else {
            return Some(format!("Blocked: '{base}' is not in the read-only allowlist"));
        }
    }

    None
}

/// `words[0]` is `git`.
fn check_git_words(words: &[String]) -> Option<String> {
    let mut rest = words.iter().skip(1).map(String::as_str);
    let mut sub = None;
    while let Some(word) = rest.next() {
        if GIT_OPTIONS_WITH_VALUE.contains(&word) {
            rest.next();
        } else if !word.starts_with('-') {
            sub = Some(word);
            break;
        }
    }
    // bare `git` or only global flags
    let sub = sub?;

    if !GIT_SAFE_SUBCOMMANDS.contains(&sub) {
        return Some(format!("Blocked: 'git {sub}' is not allowed in read-only mode"));
    }

    // Arguments are taken positionally after the subcommand slot, as written.
    let args: Vec<&str> = words.iter().skip(2).map(String::as_str).collect();
    match sub {
        "config" => {
            if !args.iter().any(|a| GIT_CONFIG_READ_FLAGS.contains(a)) {
                return Some("Blocked: 'git config' is only allowed with --get or --list".to_string());
            }
        }
        "stash" => {
            if let Some(action) = args.first() {
                if *action != "list" && *action != "show" {
                    return Some(format!(
                        "Blocked: 'git stash {action}' is not allowed in read-only mode"
                    ));
                }
            }
        }
        _ => {
            if let Some((_, restricted)) = GIT_RESTRICTED_ARGS.iter().find(|(s, _)| *s == sub) {
                if let Some(arg) = args.iter().find(|a| restricted.contains(*a)) {
                    return Some(format!(
                        "Blocked: 'git {sub} {arg}' is not allowed in read-only mode"
                    ));
                }
            }
        }
    }

    None
}

pub fn evaluate(mode: ReadonlyMode, input: &HookInput) -> Verdict {
    let command = input.field("command");
    if command.trim().is_empty() {
        return Verdict::Allow;
    }
    let reason = match mode {
        ReadonlyMode::General => check_general(command),
        ReadonlyMode::Git => check_git(command),
    };
    match reason {
        Some(message) => Verdict::Block(message),
        None => Verdict::Allow,
    }
}
