// SPDX-License-Identifier: MIT

//! Spool-building helpers shared across this crate's unit tests.

#![allow(dead_code)]

use chrono::Local;
use spindle_core::{HarnessKind, Permission, Spool, SpoolId};
use std::path::PathBuf;

pub fn pending_spool(id: &str) -> Spool {
    Spool::new_pending(
        SpoolId::new(id),
        HarnessKind::Claude,
        format!("prompt for {id}"),
        Permission::Careful,
        PathBuf::from(format!("/tmp/spindle-test-{id}.stdout")),
        PathBuf::from(format!("/tmp/spindle-test-{id}.stderr")),
        Local::now(),
    )
}

pub fn running_spool(id: &str) -> Spool {
    let mut spool = pending_spool(id);
    spool.mark_running(999_000, Local::now());
    spool
}
