// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! spindle-store: durable, one-file-per-spool JSON storage (spec §4.C1).

mod json_store;

pub use json_store::JsonSpoolStore;

use chrono::{DateTime, Local};
use spindle_core::{Spool, SpoolError, SpoolId};

/// Durable per-task record storage.
///
/// All writes are atomic (write-temp, fsync, rename). Reads are whole-file
/// parses; listing scans the directory. Filters are applied in memory after
/// parse — there is no index.
pub trait SpoolStore: Send + Sync {
    /// Persist a brand-new spool record.
    fn put(&self, spool: &Spool) -> Result<(), SpoolError>;

    /// Fetch a single record by id.
    fn get(&self, id: &SpoolId) -> Result<Spool, SpoolError>;

    /// Read-modify-write a single record. Races between updaters are
    /// resolved last-writer-wins (spec §4.C1): acceptable because only the
    /// Monitor Loop and explicit control operations touch a given record.
    ///
    /// Takes `&mut dyn FnMut` (called exactly once) rather than `FnOnce` so
    /// the trait stays object-safe — callers hold `Arc<dyn SpoolStore>`.
    fn update(
        &self,
        id: &SpoolId,
        mutator: &mut dyn FnMut(&mut Spool),
    ) -> Result<Spool, SpoolError>;

    /// List every valid record, in unspecified order. Corrupt records are
    /// quarantined (renamed `.bad`) and excluded, per spec §7.6.
    fn list(&self) -> Result<Vec<Spool>, SpoolError>;

    /// Convenience filter over `list()` — filtering happens in memory after
    /// parse, matching spec §4.C1.
    fn list_where(&self, predicate: &dyn Fn(&Spool) -> bool) -> Result<Vec<Spool>, SpoolError> {
        Ok(self.list()?.into_iter().filter(|s| predicate(s)).collect())
    }

    /// Delete terminal records whose `completed_at` predates `before`.
    /// Non-terminal records are never swept regardless of age (spec §9 open
    /// question, resolved: excluded from sweep).
    fn sweep(&self, before: DateTime<Local>) -> Result<usize, SpoolError>;
}
