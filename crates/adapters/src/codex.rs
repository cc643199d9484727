// SPDX-License-Identifier: MIT

//! Codex CLI harness adapter.
//!
//! Codex is driven non-interactively via `codex exec --json`, which streams
//! one JSON object per line on stdout (`thread.started`, `item.created`,
//! `turn.completed`, `turn.failed`). This is the only concrete reference
//! implementation of that exact contract in the retrieval pack, so the
//! parsing here follows it closely.

use crate::argv::{Argv, ParsedOutcome};
use crate::error::AdapterError;
use crate::harness_adapter::HarnessAdapter;
use serde_json::Value;
use spindle_core::{Permission, Spool};
use std::path::Path;

fn sandbox_flag_for(permission: Permission) -> &'static str {
    match permission {
        Permission::ReadOnly => "read-only",
        Permission::Careful | Permission::CarefulShard => "workspace-write",
        Permission::Full | Permission::Shard => "danger-full-access",
    }
}

/// Whether the running kernel can enforce a landlock-backed sandbox at all.
/// Codex's `workspace-write`/`read-only` modes depend on it; absent support,
/// the adapter falls back to `danger-full-access` rather than spawning a
/// child the kernel would silently fail to sandbox.
fn kernel_supports_landlock() -> bool {
    if !Path::new("/sys/kernel/security/landlock").exists() {
        return false;
    }
    kernel_release_supports_landlock(&uname_release())
}

fn uname_release() -> String {
    std::process::Command::new("uname")
        .arg("-r")
        .output()
        .ok()
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .unwrap_or_default()
}

/// Parse a `uname -r`-shaped string (e.g. `6.8.0-45-generic`) and check the
/// major.minor is at least 5.13, Codex's documented landlock floor.
fn kernel_release_supports_landlock(release: &str) -> bool {
    let core = release.split(['-', '+']).next().unwrap_or(release);
    let mut parts = core.split('.');
    let major: u32 = match parts.next().and_then(|p| p.parse().ok()) {
        Some(m) => m,
        None => return false,
    };
    let minor: u32 = match parts.next().and_then(|p| p.parse().ok()) {
        Some(m) => m,
        None => return false,
    };
    (major, minor) >= (5, 13)
}

pub struct CodexAdapter;

impl HarnessAdapter for CodexAdapter {
    fn build_command(&self, spool: &Spool) -> Result<Argv, AdapterError> {
        let mut sandbox = sandbox_flag_for(spool.permission);
        if sandbox != "danger-full-access" && !kernel_supports_landlock() {
            tracing::warn!(
                spool_id = %spool.id,
                "kernel lacks landlock support; falling back to danger-full-access sandbox"
            );
            sandbox = "danger-full-access";
        }

        let mut argv = Argv::new("codex")
            .arg("exec")
            .arg("--json")
            .arg("--sandbox")
            .arg(sandbox);

        if let Some(working_dir) = &spool.working_dir {
            argv = argv.arg("--cd").arg(working_dir.display().to_string());
        }

        if let Some(model) = &spool.model {
            argv = argv.arg("--model").arg(model);
        }

        argv = argv.arg(&spool.prompt);
        Ok(argv)
    }

    fn parse_output(&self, stdout: &[u8]) -> Result<ParsedOutcome, AdapterError> {
        let text = std::str::from_utf8(stdout).map_err(|_| AdapterError::UnparseableOutput)?;

        let mut session_id = None;
        let mut last_message = None;
        let mut completed = false;
        let mut failure: Option<String> = None;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let event: Value = match serde_json::from_str(line) {
                Ok(v) => v,
                Err(_) => continue,
            };
            match event.get("type").and_then(Value::as_str) {
                Some("thread.started") => {
                    session_id = event
                        .get("thread_id")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                }
                Some("item.created") => {
                    if let Some(text) = event
                        .get("item")
                        .and_then(|item| item.get("text"))
                        .and_then(Value::as_str)
                    {
                        last_message = Some(text.to_string());
                    }
                }
                Some("turn.completed") => {
                    completed = true;
                }
                Some("turn.failed") | Some("error") => {
                    failure = event
                        .get("error")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .or_else(|| Some("codex turn failed".to_string()));
                }
                _ => {}
            }
        }

        if let Some(reason) = failure {
            return Err(AdapterError::SpawnFailed(reason));
        }

        if completed {
            Ok(ParsedOutcome {
                result: last_message.unwrap_or_default(),
                session_id,
            })
        } else {
            Err(AdapterError::UnparseableOutput)
        }
    }

    fn resume_command(&self, session_id: &str, prompt: &str) -> Result<Argv, AdapterError> {
        Ok(Argv::new("codex")
            .arg("exec")
            .arg("--json")
            .arg("resume")
            .arg(session_id)
            .arg(prompt))
    }

    fn fallback_resume(&self, previous: &Spool, prompt: &str) -> Option<Argv> {
        let transcript = previous.result.as_deref().unwrap_or_default();
        let prologue = format!(
            "Continuing a prior thread that is no longer resumable. Prior transcript:\n\n{transcript}\n\n---\n\n{prompt}"
        );
        Some(
            Argv::new("codex")
                .arg("exec")
                .arg("--json")
                .arg(prologue),
        )
    }

    fn is_expired_session_error(&self, stderr: &[u8]) -> bool {
        let text = String::from_utf8_lossy(stderr);
        text.contains("no such session") || text.contains("session expired")
    }
}

#[cfg(test)]
#[path = "codex_tests.rs"]
mod tests;
