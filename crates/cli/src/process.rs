// SPDX-License-Identifier: MIT

//! Starting, signaling, and probing the detached `spindled` process,
//! grounded on the teacher's `daemon_process` module: same
//! spawn-detached-with-null-stdio shape, same pidfile-based liveness
//! tracking, but probing liveness via `nix::sys::signal::kill` (as
//! `spindle-adapters`'s launcher already does for harness children)
//! rather than shelling out to a separate `kill` binary.

use nix::sys::signal::kill;
use nix::unistd::Pid;
use spindle_mcp::Config;
use std::path::PathBuf;
use std::process::{Command, Stdio};

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to spawn spindled: {0}")]
    SpawnFailed(String),
    #[error("no daemon is running (no pidfile at {0})")]
    NotRunning(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Locate the `spindled` binary: a sibling of the running `spindle`
/// executable, falling back to `PATH` lookup.
fn find_spindled_binary() -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("spindled");
            if sibling.exists() {
                return sibling;
            }
        }
    }
    PathBuf::from("spindled")
}

/// Spawn `spindled` detached (null stdio, own session) and record its pid
/// in `config.pid_path`.
pub fn start_detached(config: &Config) -> Result<u32, ProcessError> {
    let binary = find_spindled_binary();
    let child = Command::new(&binary)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| ProcessError::SpawnFailed(e.to_string()))?;
    let pid = child.id();
    std::mem::forget(child);
    std::fs::write(&config.pid_path, pid.to_string())?;
    Ok(pid)
}

/// Read the pid recorded by the last `start_detached` call.
pub fn read_pid(config: &Config) -> Result<u32, ProcessError> {
    if !config.pid_path.exists() {
        return Err(ProcessError::NotRunning(config.pid_path.clone()));
    }
    let raw = std::fs::read_to_string(&config.pid_path)?;
    raw.trim()
        .parse()
        .map_err(|_| ProcessError::NotRunning(config.pid_path.clone()))
}

/// Whether a process with this pid is alive, probed via a signal-0 `kill`.
pub fn is_alive(pid: u32) -> bool {
    kill(Pid::from_raw(pid as i32), None).is_ok()
}

/// Bump the mtime of `reload_signal`, creating it if absent. The running
/// daemon watches this file with `notify` (see `spindle_mcp::runtime::watch_for_reload`)
/// and re-applies the concurrency ceiling and retention window from a
/// freshly re-read config on change.
pub fn touch_reload_signal(config: &Config) -> std::io::Result<()> {
    std::fs::write(&config.reload_signal_path, b"")
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
