// SPDX-License-Identifier: MIT

//! Claude Code harness adapter.

use crate::argv::{Argv, ParsedOutcome};
use crate::error::AdapterError;
use crate::harness_adapter::HarnessAdapter;
use spindle_core::{Permission, Spool};

/// Allowed-tools string Claude accepts via `--allowedTools`, per permission
/// profile. `Full`/`Shard` bypass the allowlist entirely via
/// `--dangerously-skip-permissions` rather than listing tools.
fn allowed_tools_for(permission: Permission) -> Option<&'static str> {
    match permission {
        Permission::ReadOnly => Some("Read,Grep,Glob"),
        Permission::Careful | Permission::CarefulShard => Some("Read,Grep,Glob,Edit,Write"),
        Permission::Full | Permission::Shard => None,
    }
}

fn skips_permissions(permission: Permission) -> bool {
    matches!(permission, Permission::Full | Permission::Shard)
}

/// Claude Code prints the continuable identifier as a trailing line of the
/// shape `Session ID: <uuid>` (harness-documented contract, spec §6).
fn scrape_session_id(stdout: &str) -> Option<String> {
    stdout.lines().rev().find_map(|line| {
        let line = line.trim();
        line.strip_prefix("Session ID:")
            .map(|rest| rest.trim().to_string())
            .filter(|id| !id.is_empty())
    })
}

pub struct ClaudeAdapter;

impl HarnessAdapter for ClaudeAdapter {
    fn build_command(&self, spool: &Spool) -> Result<Argv, AdapterError> {
        let mut argv = Argv::new("claude").arg("-p").arg(&spool.prompt);

        if let Some(system_prompt) = &spool.system_prompt {
            argv = argv.arg("--append-system-prompt").arg(system_prompt);
        }

        if skips_permissions(spool.permission) {
            argv = argv.arg("--dangerously-skip-permissions");
        } else if let Some(tools) = allowed_tools_for(spool.permission) {
            argv = argv.arg("--allowedTools").arg(tools);
        }

        if let Some(model) = &spool.model {
            argv = argv.arg("--model").arg(model);
        }

        Ok(argv)
    }

    fn parse_output(&self, stdout: &[u8]) -> Result<ParsedOutcome, AdapterError> {
        let text = std::str::from_utf8(stdout).map_err(|_| AdapterError::UnparseableOutput)?;
        if text.trim().is_empty() {
            return Err(AdapterError::UnparseableOutput);
        }
        Ok(ParsedOutcome {
            result: text.trim_end().to_string(),
            session_id: scrape_session_id(text),
        })
    }

    fn resume_command(&self, session_id: &str, prompt: &str) -> Result<Argv, AdapterError> {
        Ok(Argv::new("claude")
            .arg("-p")
            .arg(prompt)
            .arg("--resume")
            .arg(session_id))
    }

    fn fallback_resume(&self, previous: &Spool, prompt: &str) -> Option<Argv> {
        let transcript = previous.result.as_deref().unwrap_or_default();
        let prologue = format!(
            "The following is the transcript of a previous session that can no longer be resumed directly. Continue from where it left off.\n\n---\n{transcript}\n---\n\n{prompt}"
        );
        Some(Argv::new("claude").arg("-p").arg(prologue))
    }

    fn is_expired_session_error(&self, stderr: &[u8]) -> bool {
        let text = String::from_utf8_lossy(stderr);
        text.contains("session not found") || text.contains("No conversation found")
    }
}

#[cfg(test)]
#[path = "claude_tests.rs"]
mod tests;
