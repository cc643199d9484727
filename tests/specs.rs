//! Behavioral specifications for the Spindle delegation server.
//!
//! `scenarios.rs` drives `spindle_engine::Supervisor` end to end against a
//! fake harness binary, covering spec.md §8's six concrete scenarios.
//! `cli.rs` drives the `spindle` binary black-box, the way the teacher's
//! own `specs/cli/*.rs` drive `oj`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/scenarios.rs"]
mod scenarios;

#[path = "specs/cli.rs"]
mod cli;
