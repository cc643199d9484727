// SPDX-License-Identifier: MIT

//! Session continuation (spec §4.C9): pure selection/argv-building logic
//! over a store and a harness adapter. The actual admit-spawn-persist
//! sequence is shared with fresh admission via [`crate::spawn`], so a
//! resumed or fallback task goes through the same concurrency gate as any
//! other spin.

use crate::error::SupervisorError;
use spindle_adapters::{Argv, HarnessAdapter};
use spindle_core::Spool;
use spindle_store::SpoolStore;

/// Find the most-recently-created spool carrying `session_id`, to learn
/// which harness owns the continuation.
pub fn find_by_session(
    store: &dyn SpoolStore,
    session_id: &str,
) -> Result<Spool, SupervisorError> {
    store
        .list_where(&|s| s.session_id.as_deref() == Some(session_id))?
        .into_iter()
        .max_by_key(|s| s.created_at)
        .ok_or_else(|| SupervisorError::UnknownSession(session_id.to_string()))
}

/// Build the argv to continue `session_id` with a new `prompt`.
pub fn build_resume_argv(
    adapter: &dyn HarnessAdapter,
    session_id: &str,
    prompt: &str,
) -> Result<Argv, SupervisorError> {
    Ok(adapter.resume_command(session_id, prompt)?)
}

/// Build the transcript-injection argv used when the upstream session id
/// has expired, or `None` if this adapter has no fallback strategy.
pub fn build_fallback_argv(adapter: &dyn HarnessAdapter, previous: &Spool, prompt: &str) -> Option<Argv> {
    adapter.fallback_resume(previous, prompt)
}

#[cfg(test)]
#[path = "resumer_tests.rs"]
mod tests;
