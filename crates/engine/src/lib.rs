// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! spindle-engine: admission (C6), the background reaper (C7), wait
//! coordination (C8), session resumption (C9), and the tool surface that
//! ties them together (C10).

mod error;
mod gate;
mod monitor;
mod resumer;
mod spawn;
mod supervisor;
#[cfg(test)]
mod test_support;
mod wait;

pub use error::SupervisorError;
pub use gate::{AdmitPermit, ConcurrencyGate, DEFAULT_CEILING};
pub use monitor::{Dashboard, DashboardCounts, Monitor};
pub use resumer::{build_fallback_argv, build_resume_argv, find_by_session};
pub use spawn::{admit_build_and_spawn, build_command, mint_id, output_paths, NewSpool};
pub use supervisor::{SpinRequest, Supervisor, WaitMode, WaitOutcome};
pub use wait::{default_wait_timeout, WaitCoordinator};
