// SPDX-License-Identifier: MIT

//! Global admission ceiling across harnesses (spec §4.C6).
//!
//! The running count is never trusted across restarts: every admission
//! recomputes it from the on-disk census via the store. A single async
//! mutex makes the whole check-then-reserve sequence total order within one
//! process (spec §5: "admission ordering is total"); the returned
//! [`AdmitPermit`] must be held by the caller until the newly-admitted
//! spool is durably persisted as `running`, so the next admission's census
//! read sees it too.

use crate::error::SupervisorError;
use spindle_store::SpoolStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Default concurrency ceiling when `SPINDLE_MAX_CONCURRENT` is unset.
pub const DEFAULT_CEILING: usize = 15;

/// Held for the duration of one admission: from the census check through to
/// the new spool record being written. Dropping it (on early return or
/// scope exit) releases the next admission attempt.
pub struct AdmitPermit {
    _guard: OwnedMutexGuard<()>,
}

pub struct ConcurrencyGate {
    ceiling: AtomicUsize,
    store: Arc<dyn SpoolStore>,
    admission_lock: Arc<Mutex<()>>,
}

impl ConcurrencyGate {
    /// Ceiling from `SPINDLE_MAX_CONCURRENT`, falling back to
    /// [`DEFAULT_CEILING`] when unset or unparseable.
    pub fn new(store: Arc<dyn SpoolStore>) -> Self {
        let ceiling = std::env::var("SPINDLE_MAX_CONCURRENT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CEILING);
        Self::with_ceiling(store, ceiling)
    }

    pub fn with_ceiling(store: Arc<dyn SpoolStore>, ceiling: usize) -> Self {
        Self {
            ceiling: AtomicUsize::new(ceiling),
            store,
            admission_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling.load(Ordering::Relaxed)
    }

    /// Swap in a new ceiling without dropping a running admission lock,
    /// so a config reload (spec §6) can tighten or loosen the limit live.
    pub fn set_ceiling(&self, ceiling: usize) {
        self.ceiling.store(ceiling, Ordering::Relaxed);
    }

    /// Recompute the running census and either admit or fail with
    /// [`SupervisorError::AtCapacity`]. No record is created here — the
    /// caller does that while still holding the returned permit.
    pub async fn try_admit(&self) -> Result<AdmitPermit, SupervisorError> {
        let guard = self.admission_lock.clone().lock_owned().await;
        let running = self.store.list_where(&|s| s.status.is_running())?.len();
        if running >= self.ceiling() {
            return Err(SupervisorError::AtCapacity);
        }
        Ok(AdmitPermit { _guard: guard })
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
