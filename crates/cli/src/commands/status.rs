// SPDX-License-Identifier: MIT

//! `spindle status`: render `dashboard()` plus the current spool list as a
//! table, reusing the teacher's `cli::table`/`cli::color` rendering idiom
//! (SPEC_FULL §10.2). Reads the persisted store directly rather than
//! querying the running `spindled` process — `dashboard()` is a pure
//! computation over persisted state, so a second process can compute it
//! from the same `spools_dir` without an IPC round trip.

use crate::color;
use crate::table::{Column, Table};
use spindle_adapters::{ProcessLauncher, ShardManager};
use spindle_core::{OsRngIdGen, SystemClock};
use spindle_engine::Supervisor;
use spindle_mcp::Config;
use std::sync::Arc;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.ensure_dirs()?;

    let store: Arc<dyn spindle_store::SpoolStore> =
        Arc::new(spindle_store::JsonSpoolStore::open(&config.spools_dir)?);
    let supervisor = Supervisor::new(
        store,
        Arc::new(ProcessLauncher::new()),
        Arc::new(ShardManager::new()),
        Arc::new(SystemClock),
        Arc::new(OsRngIdGen),
        config.spools_dir.clone(),
        config.shards_dir.clone(),
    );

    let dashboard = supervisor.dashboard()?;
    let spools = supervisor.spools()?;

    println!("{}", color::header("Spools"));
    let mut table = Table::new(vec![
        Column::left("ID"),
        Column::left("HARNESS"),
        Column::status("STATUS"),
        Column::muted("TAGS"),
    ]);
    for spool in &spools {
        table.row(vec![
            spool.id.short(10).to_string(),
            spool.harness.to_string(),
            spool.status.as_str().to_string(),
            spool.tags.join(","),
        ]);
    }
    if table.is_empty() {
        println!("{}", color::muted("(no spools)"));
    } else {
        table.render(&mut std::io::stdout());
    }

    println!();
    println!("{}", color::header("Summary"));
    println!(
        "pending={} running={} complete={} error={} timeout={} killed={}",
        dashboard.counts.pending,
        dashboard.counts.running,
        dashboard.counts.complete,
        dashboard.counts.error,
        dashboard.counts.timeout,
        dashboard.counts.killed,
    );

    if !dashboard.needs_attention.is_empty() {
        println!();
        println!("{}", color::header("Needs attention"));
        for id in &dashboard.needs_attention {
            println!("  {}", id.short(10));
        }
    }

    Ok(())
}
