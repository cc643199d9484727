// SPDX-License-Identifier: MIT

//! The background reaper (spec §4.C7): detects completion, finalizes
//! spools, enforces timeouts, recovers orphans at startup, and serves the
//! read-only observability operations (`peek`, `dashboard`).
//!
//! Per-spool processing errors are caught and logged rather than
//! propagated, so one bad record can never stall the tick (spec §7's
//! propagation policy) — the same catch-and-log shape the teacher's engine
//! applies around its own per-job processing.

use crate::error::SupervisorError;
use crate::gate::ConcurrencyGate;
use crate::{resumer, spawn};
use spindle_adapters::{adapter_for, HarnessAdapter, ProcessLauncher};
use spindle_core::{Clock, HarnessKind, IdGen, Spool, SpoolId, SpoolStatus};
use spindle_store::SpoolStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// A spool whose `started_at` has exceeded this many seconds with no
/// explicit `timeout_seconds` is flagged by `dashboard()` as needing
/// attention.
const DEFAULT_EXPECTED_SECS: i64 = 600;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DashboardCounts {
    pub pending: usize,
    pub running: usize,
    pub complete: usize,
    pub error: usize,
    pub timeout: usize,
    pub killed: usize,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub counts: DashboardCounts,
    pub needs_attention: Vec<SpoolId>,
}

pub struct Monitor {
    store: Arc<dyn SpoolStore>,
    launcher: Arc<ProcessLauncher>,
    gate: Arc<ConcurrencyGate>,
    clock: Arc<dyn Clock>,
    id_gen: Arc<dyn IdGen>,
    spools_root: PathBuf,
}

impl Monitor {
    pub fn new(
        store: Arc<dyn SpoolStore>,
        launcher: Arc<ProcessLauncher>,
        gate: Arc<ConcurrencyGate>,
        clock: Arc<dyn Clock>,
        id_gen: Arc<dyn IdGen>,
        spools_root: PathBuf,
    ) -> Self {
        Self {
            store,
            launcher,
            gate,
            clock,
            id_gen,
            spools_root,
        }
    }

    /// Spawn the tick loop as a background task. Runs orphan recovery once
    /// before the first tick.
    pub fn spawn_task(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(e) = self.recover_orphans().await {
                tracing::error!(error = %e, "orphan recovery failed at startup");
            }
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            loop {
                interval.tick().await;
                self.tick().await;
            }
        })
    }

    /// One reaper pass over every `running` record.
    pub async fn tick(&self) {
        let running = match self.store.list_where(&|s| s.status.is_running()) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "monitor tick failed to list running spools");
                return;
            }
        };
        for spool in running {
            if let Err(e) = self.process_one(&spool).await {
                tracing::error!(spool_id = %spool.id, error = %e, "monitor tick failed to process spool");
            }
        }
    }

    async fn process_one(&self, spool: &Spool) -> Result<(), SupervisorError> {
        let id = spool.id.clone();

        if self.launcher.take_cancelled(&id) {
            ProcessLauncher::terminate(spool.pid).await;
            self.launcher.clear_watchdog(&id);
            self.store.update(&id, &mut |s| {
                if s.status.is_running() {
                    s.mark_killed(self.clock.now());
                }
            })?;
            tracing::info!(spool_id = %id, "spool cancelled");
            return Ok(());
        }

        if ProcessLauncher::is_alive(spool.pid) {
            if self.launcher.deadline_elapsed(&id) {
                ProcessLauncher::terminate(spool.pid).await;
                self.launcher.clear_watchdog(&id);
                self.store.update(&id, &mut |s| {
                    if s.status.is_running() {
                        s.mark_timeout(self.clock.now());
                    }
                })?;
                tracing::warn!(spool_id = %id, "spool timed out");
            }
            return Ok(());
        }

        // The child is dead; reap it so it never lingers as a zombie.
        ProcessLauncher::reap(spool.pid);
        self.launcher.clear_watchdog(&id);

        let adapter = adapter_for(spool.harness);
        let stdout = std::fs::read(&spool.stdout_path).unwrap_or_default();

        match adapter.parse_output(&stdout) {
            Ok(outcome) => {
                self.store.update(&id, &mut |s| {
                    if s.status.is_running() {
                        s.mark_complete(outcome.result.clone(), outcome.session_id.clone(), self.clock.now());
                    }
                })?;
                tracing::info!(spool_id = %id, "spool completed");
                Ok(())
            }
            Err(_) => {
                let stderr = std::fs::read(&spool.stderr_path).unwrap_or_default();
                let tail = tail_text(&stderr, 4096);

                if spool.retry_of.is_some() && adapter.is_expired_session_error(&stderr) {
                    self.spawn_fallback(spool, adapter.as_ref(), &tail).await
                } else {
                    self.store.update(&id, &mut |s| {
                        if s.status.is_running() {
                            s.mark_error(tail.clone(), self.clock.now());
                        }
                    })?;
                    tracing::warn!(spool_id = %id, "spool finished with error");
                    Ok(())
                }
            }
        }
    }

    /// Re-spawn via transcript injection after detecting an expired
    /// upstream session on a resume attempt (spec §4.C9/§8 scenario 6).
    /// The failed attempt is finalized as `error`, pointing at the new
    /// spool; the new spool remains linked to the *original* via
    /// `retry_of`, so both attempts stay independently inspectable.
    async fn spawn_fallback(
        &self,
        failed: &Spool,
        adapter: &dyn HarnessAdapter,
        stderr_tail: &str,
    ) -> Result<(), SupervisorError> {
        let original_id = failed
            .retry_of
            .clone()
            .expect("checked by caller: retry_of is Some");
        let original = self.store.get(&original_id)?;

        let outcome = match resumer::build_fallback_argv(adapter, &original, &failed.prompt) {
            Some(argv) => {
                let new_id = spawn::mint_id(self.id_gen.as_ref(), failed.harness);
                let (stdout_path, stderr_path) = spawn::output_paths(&self.spools_root, &new_id);
                let spec = spawn::NewSpool {
                    harness: failed.harness,
                    prompt: failed.prompt.clone(),
                    system_prompt: failed.system_prompt.clone(),
                    permission: failed.permission,
                    working_dir: failed.working_dir.clone(),
                    allowed_tools: failed.allowed_tools.clone(),
                    model: failed.model.clone(),
                    sandbox: failed.sandbox.clone(),
                    tags: failed.tags.clone(),
                    timeout_seconds: failed.timeout_seconds,
                    retry_of: Some(original_id.clone()),
                    shard: failed.shard.clone(),
                };
                spawn::admit_build_and_spawn(
                    &self.gate,
                    self.store.as_ref(),
                    &self.launcher,
                    self.clock.as_ref(),
                    new_id,
                    spec,
                    argv,
                    stdout_path,
                    stderr_path,
                )
                .await
            }
            None => Err(SupervisorError::MissingField("fallback_resume")),
        };

        let message = match &outcome {
            Ok(new_spool) => format!("expired session; retried via transcript injection as {}", new_spool.id),
            Err(e) => format!("expired session; fallback unavailable ({e}): {stderr_tail}"),
        };
        self.store.update(&failed.id, &mut |s| {
            if s.status.is_running() {
                s.mark_error(message.clone(), self.clock.now());
            }
        })?;

        match outcome {
            Ok(new_spool) => {
                tracing::info!(spool_id = %failed.id, fallback_id = %new_spool.id, "expired session recovered via transcript fallback");
                Ok(())
            }
            Err(_) => Ok(()),
        }
    }

    /// For every persisted `running` record at startup, verify the pid is
    /// both alive and plausibly the right process image; otherwise finalize
    /// it as `error` with reason "orphaned" (spec §4.C7/§8).
    pub async fn recover_orphans(&self) -> Result<usize, SupervisorError> {
        let running = self.store.list_where(&|s| s.status.is_running())?;
        let mut recovered = 0;
        for spool in running {
            let alive = ProcessLauncher::is_alive(spool.pid)
                && process_image_plausible(spool.pid, spool.harness);
            if !alive {
                self.store.update(&spool.id, &mut |s| {
                    if s.status.is_running() {
                        s.mark_error("orphaned: process not found at startup".to_string(), self.clock.now());
                    }
                })?;
                tracing::warn!(spool_id = %spool.id, "recovered orphaned spool at startup");
                recovered += 1;
            }
        }
        Ok(recovered)
    }

    /// Tail the last `n` lines of the spool's live stdout artifact, without
    /// touching the child or the tick loop.
    pub fn peek(&self, id: &SpoolId, n: usize) -> Result<String, SupervisorError> {
        let spool = self.store.get(id)?;
        Ok(tail_lines(&spool.stdout_path, n))
    }

    /// Summarize all records by status, flagging `running` spools that have
    /// exceeded their expected duration.
    pub fn dashboard(&self) -> Result<Dashboard, SupervisorError> {
        let all = self.store.list()?;
        let now = self.clock.now();
        let mut counts = DashboardCounts::default();
        let mut needs_attention = Vec::new();

        for s in &all {
            match s.status {
                SpoolStatus::Pending => counts.pending += 1,
                SpoolStatus::Running => {
                    counts.running += 1;
                    let expected = s.timeout_seconds.map(|t| t as i64).unwrap_or(DEFAULT_EXPECTED_SECS);
                    if let Some(started) = s.started_at {
                        if (now - started).num_seconds() > expected {
                            needs_attention.push(s.id.clone());
                        }
                    }
                }
                SpoolStatus::Complete => counts.complete += 1,
                SpoolStatus::Error => counts.error += 1,
                SpoolStatus::Timeout => counts.timeout += 1,
                SpoolStatus::Killed => counts.killed += 1,
            }
        }

        Ok(Dashboard {
            counts,
            needs_attention,
        })
    }
}

fn tail_text(bytes: &[u8], max_bytes: usize) -> String {
    let start = bytes.len().saturating_sub(max_bytes);
    String::from_utf8_lossy(&bytes[start..]).trim().to_string()
}

fn tail_lines(path: &Path, n: usize) -> String {
    let content = std::fs::read_to_string(path).unwrap_or_default();
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

/// Best-effort check that `pid`'s command line matches the expected harness
/// binary name. Returns `true` (plausible) when `/proc` is unavailable,
/// since liveness alone already ruled out the clearly-dead case.
fn process_image_plausible(pid: u32, harness: HarnessKind) -> bool {
    match std::fs::read(format!("/proc/{pid}/cmdline")) {
        Ok(bytes) => {
            let first = bytes.split(|&b| b == 0).next().unwrap_or(&[]);
            let cmd = String::from_utf8_lossy(first);
            let name = Path::new(cmd.as_ref())
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or("");
            name == harness.as_str()
        }
        Err(_) => true,
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
