//! Hook command - evaluates a tool-use event read from stdin.

use std::io::Read;
use std::process::ExitCode;

use anyhow::{Context, Result};

use crate::hooks::{self, redirect, HookInput, HookKind, Verdict};

/// Execute a hook. The exit code is the agent-facing verdict.
pub fn cmd_hook(kind: HookKind) -> Result<ExitCode> {
    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .context("Failed to read hook input from stdin")?;

    let verdict = hooks::run(kind, &raw);
    if kind == HookKind::RedirectAgent && matches!(verdict, Verdict::Respond(_)) {
        log_redirect(&raw);
    }
    if let Some(out) = verdict.stdout() {
        println!("{out}");
    }
    Ok(ExitCode::from(verdict.exit_code()))
}

/// Best effort: a log failure never changes the verdict.
fn log_redirect(raw: &str) {
    let value = std::env::var(redirect::LOG_ENV).ok();
    let Some(path) = redirect::log_path_from(value.as_deref()) else {
        return;
    };
    let Some(line) = serde_json::from_str::<HookInput>(raw)
        .ok()
        .and_then(|input| redirect::log_line(&input))
    else {
        return;
    };
    if let Err(e) = redirect::append_log(&path, &line) {
        tracing::debug!("cannot write redirect log {}: {e}", path.display());
    }
}
