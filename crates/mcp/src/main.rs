// SPDX-License-Identifier: MIT

//! Spindle delegation server daemon (`spindled`).
//!
//! Serves the MCP tool surface over stdio. Typically launched detached by
//! the `spindle` CLI's `start`/`serve` subcommands, not invoked directly.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use spindle_adapters::{ProcessLauncher, ShardManager};
use spindle_core::{OsRngIdGen, SystemClock};
use spindle_engine::Supervisor;
use spindle_mcp::{runtime, Config, SpindleServer, SpindleTools};
use spindle_store::JsonSpoolStore;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("spindled {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" => {
                println!("spindled {}", env!("CARGO_PKG_VERSION"));
                println!("MCP server for delegating work to child coding-agent harnesses.");
                println!("Normally started by `spindle start` or `spindle serve`.");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                std::process::exit(2);
            }
        }
    }

    let config = Config::load()?;
    config.ensure_dirs()?;
    let _log_guard = spindle_mcp::logging::setup_logging(&config)?;

    // Config-file ceiling applies only when the environment variable hasn't
    // already set one (SPINDLE_MAX_CONCURRENT takes precedence, spec §6).
    if std::env::var_os("SPINDLE_MAX_CONCURRENT").is_none() {
        if let Some(ceiling) = config.max_concurrent {
            std::env::set_var("SPINDLE_MAX_CONCURRENT", ceiling.to_string());
        }
    }

    let store: Arc<dyn spindle_store::SpoolStore> = Arc::new(JsonSpoolStore::open(&config.spools_dir)?);
    let launcher = Arc::new(ProcessLauncher::new());
    let shards = Arc::new(ShardManager::new());
    let clock = Arc::new(SystemClock);
    let id_gen = Arc::new(OsRngIdGen);

    let supervisor = Supervisor::new(
        store.clone(),
        launcher,
        shards,
        clock,
        id_gen,
        config.spools_dir.clone(),
        config.shards_dir.clone(),
    );
    let _monitor_task = supervisor.start_monitor();

    let retention_hours = Arc::new(AtomicU64::new(config.retention_hours));
    let _sweep_task = runtime::spawn_sweeper(store, retention_hours.clone());
    let _reload_watcher = runtime::watch_for_reload(&config, supervisor.clone(), retention_hours);

    let tools = Arc::new(SpindleTools::new(supervisor));
    let server = SpindleServer::new(tools);

    info!("spindled starting, serving MCP over stdio");
    server.serve_stdio().await?;
    Ok(())
}
