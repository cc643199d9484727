// SPDX-License-Identifier: MIT

//! Multi-spool wait primitives (spec §4.C8): gather-all and stream-as-ready,
//! both bounded-backoff pollers over the Spool Store. Neither mode holds a
//! process handle — only the store is read (spec §5).

use spindle_core::{Spool, SpoolId};
use spindle_store::SpoolStore;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

const POLL_START: Duration = Duration::from_millis(100);
const POLL_CAP: Duration = Duration::from_secs(1);

pub struct WaitCoordinator {
    store: Arc<dyn SpoolStore>,
}

impl WaitCoordinator {
    pub fn new(store: Arc<dyn SpoolStore>) -> Self {
        Self { store }
    }

    fn fetch(&self, id: &SpoolId) -> Option<Spool> {
        self.store.get(id).ok()
    }

    /// Block until every id in `ids` is terminal or `deadline` elapses,
    /// whichever comes first. The result preserves `ids`' order; an id
    /// still non-terminal at the deadline is reported with its current
    /// state (spec §8: "any spool that fails to terminate ... reported
    /// with its current state").
    pub async fn gather(&self, ids: &[SpoolId], deadline: Duration) -> Vec<Spool> {
        let start = Instant::now();
        let mut interval = POLL_START;
        loop {
            let snapshot: Vec<Option<Spool>> = ids.iter().map(|id| self.fetch(id)).collect();
            let all_terminal = snapshot
                .iter()
                .all(|s| s.as_ref().map(|s| s.status.is_terminal()).unwrap_or(false));

            if all_terminal || start.elapsed() >= deadline {
                return ids
                    .iter()
                    .zip(snapshot)
                    .filter_map(|(id, s)| s.or_else(|| self.fetch(id)))
                    .collect();
            }

            tokio::time::sleep(interval.min(deadline.saturating_sub(start.elapsed()))).await;
            interval = (interval * 2).min(POLL_CAP);
        }
    }

    /// Yield each id in `ids` over `tx` exactly once, as soon as it is
    /// observed terminal, tie-breaking same-tick arrivals by ascending id
    /// (spec §4.C8). Returns once every id has been yielded or `deadline`
    /// elapses.
    pub async fn stream(&self, ids: &[SpoolId], deadline: Duration, tx: mpsc::Sender<Spool>) {
        let start = Instant::now();
        let mut interval = POLL_START;
        let mut seen: HashSet<SpoolId> = HashSet::new();

        loop {
            let mut newly_terminal: Vec<Spool> = ids
                .iter()
                .filter(|id| !seen.contains(*id))
                .filter_map(|id| self.fetch(id))
                .filter(|s| s.status.is_terminal())
                .collect();
            newly_terminal.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));

            for spool in newly_terminal {
                seen.insert(spool.id.clone());
                if tx.send(spool).await.is_err() {
                    return;
                }
            }

            if seen.len() == ids.len() || start.elapsed() >= deadline {
                return;
            }

            tokio::time::sleep(interval.min(deadline.saturating_sub(start.elapsed()))).await;
            interval = (interval * 2).min(POLL_CAP);
        }
    }
}

/// Default deadline used when the caller specifies none.
pub fn default_wait_timeout() -> Duration {
    Duration::from_secs(300)
}

#[cfg(test)]
#[path = "wait_tests.rs"]
mod tests;
