// SPDX-License-Identifier: MIT

//! The per-harness dispatch seam (spec §4.C3).

use crate::argv::{Argv, ParsedOutcome};
use crate::error::AdapterError;
use spindle_core::Spool;

/// Per-harness command construction, output parsing, and session-resume
/// policy. One implementation per member of `HarnessKind`. Synchronous by
/// design — these are pure functions over a `Spool`/byte buffer; the async
/// work (actually running a harness) lives in `ProcessLauncher`.
pub trait HarnessAdapter: Send + Sync {
    /// Build the argv for a fresh spawn of this spool.
    fn build_command(&self, spool: &Spool) -> Result<Argv, AdapterError>;

    /// Parse a finished child's stdout into a result and (if present) a
    /// continuable session id.
    fn parse_output(&self, stdout: &[u8]) -> Result<ParsedOutcome, AdapterError>;

    /// Build the argv to continue an existing session with a new prompt.
    fn resume_command(&self, session_id: &str, prompt: &str) -> Result<Argv, AdapterError>;

    /// Build a from-scratch argv that re-creates a conversation by injecting
    /// the prior transcript as a prologue, used when `session_id` has
    /// expired upstream. Returns `None` if this adapter has no fallback
    /// (the caller should then surface a plain runtime error).
    fn fallback_resume(&self, previous: &Spool, prompt: &str) -> Option<Argv>;

    /// Whether `stderr` carries this adapter's fingerprint for "the upstream
    /// session this id referred to no longer exists".
    fn is_expired_session_error(&self, stderr: &[u8]) -> bool;
}
