// SPDX-License-Identifier: MIT

//! Detached process spawning, liveness checks, and forced termination
//! (spec §4.C4).
//!
//! The launcher never waits on a spawned child — ownership of reaping
//! belongs to the Monitor Loop, which polls `is_alive`/`deadline_for` on its
//! own tick. This mirrors the teacher's `run_with_timeout` helper in spirit
//! (wrap a subprocess call with an explicit deadline) but splits the
//! deadline *observation* out from the spawn call itself, since here the
//! process that notices a timeout elapsing is not the one that spawned it.

use crate::argv::Argv;
use crate::error::AdapterError;
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag};
use nix::unistd::Pid;
use parking_lot::Mutex;
use spindle_core::SpoolId;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Grace period between SIGTERM and SIGKILL when terminating a child's
/// process group.
pub const TERMINATION_GRACE: Duration = Duration::from_secs(3);

struct Watchdog {
    deadline: Instant,
}

/// Spawns harness children detached into their own process group, and owns
/// the bookkeeping the Monitor Loop needs to reap them: per-spool timeout
/// deadlines and cancellation requests. Holds no process handles — only
/// pids, which is all a poll-based reaper needs.
#[derive(Default)]
pub struct ProcessLauncher {
    watchdogs: Mutex<HashMap<SpoolId, Watchdog>>,
    cancelled: Mutex<HashSet<SpoolId>>,
}

impl ProcessLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `argv` detached, redirecting stdout/stderr to the given files
    /// and closing stdin. Returns the child's pid immediately; does not
    /// wait for exit.
    pub async fn spawn(
        &self,
        spool_id: &SpoolId,
        argv: &Argv,
        stdout_path: &Path,
        stderr_path: &Path,
        working_dir: Option<&Path>,
        timeout_seconds: Option<u64>,
    ) -> Result<u32, AdapterError> {
        let stdout_file = File::create(stdout_path)?;
        let stderr_file = File::create(stderr_path)?;

        let mut command = Command::new(&argv.program);
        command
            .args(&argv.args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout_file))
            .stderr(Stdio::from(stderr_file))
            .process_group(0);

        if let Some(dir) = working_dir {
            command.current_dir(dir);
        }

        let child = command
            .spawn()
            .map_err(|e| AdapterError::SpawnFailed(e.to_string()))?;
        let pid = child.id();

        // Detach: the Monitor Loop reaps by pid via `reap`, not by holding
        // this handle or awaiting this child's exit.
        std::mem::forget(child);

        if let Some(secs) = timeout_seconds {
            self.watchdogs.lock().insert(
                spool_id.clone(),
                Watchdog {
                    deadline: Instant::now() + Duration::from_secs(secs),
                },
            );
        }

        Ok(pid)
    }

    /// Whether the deadline registered at spawn time has elapsed.
    pub fn deadline_elapsed(&self, spool_id: &SpoolId) -> bool {
        self.watchdogs
            .lock()
            .get(spool_id)
            .map(|w| Instant::now() >= w.deadline)
            .unwrap_or(false)
    }

    /// Stop tracking a spool's watchdog (on reap, regardless of outcome).
    pub fn clear_watchdog(&self, spool_id: &SpoolId) {
        self.watchdogs.lock().remove(spool_id);
    }

    /// Record a cancellation request (`spin_drop`). Does not itself touch
    /// the process — the Monitor Loop observes this flag on its next tick
    /// and performs the actual termination, keeping a single writer of
    /// process state.
    pub fn request_cancel(&self, spool_id: &SpoolId) {
        self.cancelled.lock().insert(spool_id.clone());
    }

    /// Consume and return whether cancellation was requested for this spool.
    pub fn take_cancelled(&self, spool_id: &SpoolId) -> bool {
        self.cancelled.lock().remove(spool_id)
    }

    /// Whether the process is still alive, probed via a signal-0 `kill`.
    pub fn is_alive(pid: u32) -> bool {
        kill(Pid::from_raw(pid as i32), None).is_ok()
    }

    /// Reap a child the Monitor Loop has observed as dead, so it doesn't
    /// linger as a zombie. Safe to call more than once; errors (already
    /// reaped, no such child) are not actionable and are ignored.
    pub fn reap(pid: u32) {
        let _ = waitpid(Pid::from_raw(pid as i32), Some(WaitPidFlag::WNOHANG));
    }

    /// Send the termination sequence to a child's process group: SIGTERM,
    /// wait up to `TERMINATION_GRACE` polling liveness, then SIGKILL.
    pub async fn terminate(pid: u32) {
        let group = Pid::from_raw(-(pid as i32));
        let _ = kill(group, Signal::SIGTERM);

        let deadline = Instant::now() + TERMINATION_GRACE;
        while Instant::now() < deadline {
            if !Self::is_alive(pid) {
                Self::reap(pid);
                return;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        if Self::is_alive(pid) {
            let _ = kill(group, Signal::SIGKILL);
        }
        Self::reap(pid);
    }
}

#[cfg(test)]
#[path = "launcher_tests.rs"]
mod tests;
