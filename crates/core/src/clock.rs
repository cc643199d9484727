// SPDX-License-Identifier: MIT

//! Injectable wall-clock so that timestamp-dependent logic is testable.

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::sync::Arc;

/// Produces the current local time. Abstracted so tests can hold time still.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Real wall-clock, backed by `chrono::Local::now`.
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only advances when told to; for deterministic tests.
#[derive(Clone)]
pub struct FakeClock {
    now: Arc<Mutex<DateTime<Local>>>,
}

impl FakeClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, delta: chrono::Duration) {
        let mut guard = self.now.lock();
        *guard += delta;
    }

    pub fn set(&self, at: DateTime<Local>) {
        *self.now.lock() = at;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_clock_only_advances_when_asked() {
        let start = Local::now();
        let clock = FakeClock::new(start);
        assert_eq!(clock.now(), start);
        clock.advance(chrono::Duration::seconds(5));
        assert_eq!(clock.now(), start + chrono::Duration::seconds(5));
    }
}
