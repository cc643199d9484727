// SPDX-License-Identifier: MIT

//! The Spool record: the sole first-class entity in Spindle.

use crate::harness::HarnessKind;
use crate::permission::Permission;
use crate::shard::Shard;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

crate::define_id! {
    /// Unique identifier for a spool, globally unique within a store.
    ///
    /// Harnesses that need a visible discriminator prefix their ids, e.g.
    /// `codex-<hex>`.
    pub struct SpoolId;
}

/// Lifecycle state of a spool. See the state machine in spec §4.C7:
///
/// ```text
/// pending --admit--> running --exit ok--> complete
///                        \--exit err---> error
///                        \--deadline--> timeout
///                        \--cancel---->  killed
/// complete | error | timeout | killed  (all terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpoolStatus {
    Pending,
    Running,
    Complete,
    Error,
    Timeout,
    Killed,
}

impl SpoolStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SpoolStatus::Complete | SpoolStatus::Error | SpoolStatus::Timeout | SpoolStatus::Killed
        )
    }

    pub fn is_running(&self) -> bool {
        matches!(self, SpoolStatus::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpoolStatus::Pending => "pending",
            SpoolStatus::Running => "running",
            SpoolStatus::Complete => "complete",
            SpoolStatus::Error => "error",
            SpoolStatus::Timeout => "timeout",
            SpoolStatus::Killed => "killed",
        }
    }
}

impl std::fmt::Display for SpoolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One record per delegated task. The sole first-class entity in Spindle.
///
/// See spec §3 for the field contract and invariants. Field population is
/// enforced by the constructors/transition methods below rather than by
/// separate per-state payload types, so that the on-disk JSON schema stays
/// flat (one object, `status` as a plain discriminant) per spec §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spool {
    pub id: SpoolId,
    pub harness: HarnessKind,
    pub status: SpoolStatus,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_tools: Option<String>,
    pub permission: Permission,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub pid: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard: Option<Shard>,
    pub stdout_path: PathBuf,
    pub stderr_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Local>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Local>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Local>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_of: Option<SpoolId>,
}

impl Spool {
    /// Construct a freshly-admitted, not-yet-spawned spool (status = pending).
    #[allow(clippy::too_many_arguments)]
    pub fn new_pending(
        id: SpoolId,
        harness: HarnessKind,
        prompt: String,
        permission: Permission,
        stdout_path: PathBuf,
        stderr_path: PathBuf,
        created_at: DateTime<Local>,
    ) -> Self {
        Self {
            id,
            harness,
            status: SpoolStatus::Pending,
            prompt,
            system_prompt: None,
            working_dir: None,
            allowed_tools: None,
            permission,
            model: None,
            sandbox: None,
            tags: Vec::new(),
            pid: 0,
            session_id: None,
            shard: None,
            stdout_path,
            stderr_path,
            result: None,
            error: None,
            created_at,
            started_at: None,
            completed_at: None,
            timeout_seconds: None,
            retry_of: None,
        }
    }

    /// Transition pending -> running, recording the detached child's pid.
    pub fn mark_running(&mut self, pid: u32, started_at: DateTime<Local>) {
        self.pid = pid;
        self.started_at = Some(started_at);
        self.status = SpoolStatus::Running;
    }

    /// Transition running -> complete.
    pub fn mark_complete(&mut self, result: String, session_id: Option<String>, at: DateTime<Local>) {
        self.pid = 0;
        self.result = Some(result);
        if session_id.is_some() {
            self.session_id = session_id;
        }
        self.completed_at = Some(at);
        self.status = SpoolStatus::Complete;
    }

    /// Transition running -> error.
    pub fn mark_error(&mut self, error: String, at: DateTime<Local>) {
        self.pid = 0;
        self.error = Some(error);
        self.completed_at = Some(at);
        self.status = SpoolStatus::Error;
    }

    /// Transition running -> timeout.
    pub fn mark_timeout(&mut self, at: DateTime<Local>) {
        self.pid = 0;
        self.error = Some(format!(
            "timeout: exceeded {}s",
            self.timeout_seconds.unwrap_or(0)
        ));
        self.completed_at = Some(at);
        self.status = SpoolStatus::Timeout;
    }

    /// Transition running -> killed.
    pub fn mark_killed(&mut self, at: DateTime<Local>) {
        self.pid = 0;
        self.completed_at = Some(at);
        self.status = SpoolStatus::Killed;
    }

    /// Invariant 2 of spec §3: exactly one of result/error is populated iff
    /// the status is terminal, and both are absent otherwise.
    pub fn satisfies_result_error_invariant(&self) -> bool {
        match self.status {
            SpoolStatus::Pending | SpoolStatus::Running => {
                self.result.is_none() && self.error.is_none()
            }
            SpoolStatus::Complete => self.result.is_some() && self.error.is_none(),
            SpoolStatus::Error | SpoolStatus::Timeout => {
                self.result.is_none() && self.error.is_some()
            }
            SpoolStatus::Killed => self.result.is_none(),
        }
    }
}

#[cfg(test)]
#[path = "spool_tests.rs"]
mod tests;
