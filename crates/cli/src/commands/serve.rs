// SPDX-License-Identifier: MIT

//! `spindle serve [--http <addr>]`: run the MCP server in the foreground.
//! Stdio by default; `--http` is accepted but not yet wired to a listening
//! transport (see DESIGN.md) so it surfaces a clear error rather than a
//! silently wrong binding.

use spindle_adapters::{ProcessLauncher, ShardManager};
use spindle_core::{OsRngIdGen, SystemClock};
use spindle_engine::Supervisor;
use spindle_mcp::{runtime, Config, SpindleServer, SpindleTools};
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

pub async fn run(http: Option<String>) -> anyhow::Result<()> {
    if let Some(addr) = http {
        anyhow::bail!(
            "--http {addr} is not yet implemented; run `spindle serve` without --http for stdio, \
             or launch `spindled` directly once an HTTP transport is wired up"
        );
    }

    let config = Config::load()?;
    config.ensure_dirs()?;
    let _log_guard = spindle_mcp::logging::setup_logging(&config)?;

    if std::env::var_os("SPINDLE_MAX_CONCURRENT").is_none() {
        if let Some(ceiling) = config.max_concurrent {
            std::env::set_var("SPINDLE_MAX_CONCURRENT", ceiling.to_string());
        }
    }

    let store: Arc<dyn spindle_store::SpoolStore> =
        Arc::new(spindle_store::JsonSpoolStore::open(&config.spools_dir)?);
    let supervisor = Supervisor::new(
        store.clone(),
        Arc::new(ProcessLauncher::new()),
        Arc::new(ShardManager::new()),
        Arc::new(SystemClock),
        Arc::new(OsRngIdGen),
        config.spools_dir.clone(),
        config.shards_dir.clone(),
    );
    let _monitor_task = supervisor.start_monitor();

    let retention_hours = Arc::new(AtomicU64::new(config.retention_hours));
    let _sweep_task = runtime::spawn_sweeper(store, retention_hours.clone());
    let _reload_watcher = runtime::watch_for_reload(&config, supervisor.clone(), retention_hours);

    let tools = Arc::new(SpindleTools::new(supervisor));
    let server = SpindleServer::new(tools);
    server.serve_stdio().await?;
    Ok(())
}
