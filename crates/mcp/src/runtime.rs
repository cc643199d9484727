// SPDX-License-Identifier: MIT

//! Background maintenance tasks run alongside the MCP server: the
//! retention sweeper and the config-reload file watcher (spec §6, §3's
//! Lifecycle clause). Grounded on the teacher's own
//! `crates/adapters/src/agent/watcher.rs::create_file_watcher`, which
//! already uses `notify::recommended_watcher` with a closure forwarding
//! into a `tokio::sync::mpsc` channel.

use crate::config::Config;
use chrono::{Duration as ChronoDuration, Local};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use spindle_engine::Supervisor;
use spindle_store::SpoolStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Hourly is frequent enough relative to the shortest sensible retention
/// window (spec.md's default is 24h) without adding meaningful overhead.
const SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(3600);

/// Spawn the periodic retention sweep (spec.md §3's Lifecycle clause):
/// deletes spool records older than `retention_hours`, which
/// [`watch_for_reload`] can update live without a restart.
pub fn spawn_sweeper(store: Arc<dyn SpoolStore>, retention_hours: Arc<AtomicU64>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let hours = retention_hours.load(Ordering::Relaxed);
            let cutoff = Local::now() - ChronoDuration::hours(hours as i64);
            match store.sweep(cutoff) {
                Ok(removed) if removed > 0 => tracing::info!(removed, "swept retired spool records"),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "retention sweep failed"),
            }
        }
    })
}

/// Watch `reload_signal_path` and, on change, re-read `config.toml` and
/// apply the settings that can change live: the concurrency ceiling (when
/// `SPINDLE_MAX_CONCURRENT` isn't pinning it) and the sweeper's retention
/// window. Returns the watcher on success; the caller must keep it alive
/// for as long as reload should keep working, since dropping it stops the
/// underlying OS watch.
pub fn watch_for_reload(
    config: &Config,
    supervisor: Arc<Supervisor>,
    retention_hours: Arc<AtomicU64>,
) -> Option<RecommendedWatcher> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(1);
    let mut watcher = match notify::recommended_watcher(move |res: Result<notify::Event, _>| {
        if res.is_ok() {
            let _ = tx.blocking_send(());
        }
    }) {
        Ok(w) => w,
        Err(e) => {
            tracing::warn!(error = %e, "failed to create config reload watcher");
            return None;
        }
    };

    if let Err(e) = watcher.watch(&config.reload_signal_path, RecursiveMode::NonRecursive) {
        tracing::warn!(error = %e, "failed to watch reload signal, config reload disabled");
        return None;
    }

    tokio::spawn(async move {
        while rx.recv().await.is_some() {
            match Config::load() {
                Ok(new_config) => {
                    if std::env::var_os("SPINDLE_MAX_CONCURRENT").is_none() {
                        let ceiling = new_config.max_concurrent.unwrap_or(spindle_engine::DEFAULT_CEILING);
                        supervisor.set_concurrency_ceiling(ceiling);
                    }
                    retention_hours.store(new_config.retention_hours, Ordering::Relaxed);
                    tracing::info!("config reloaded");
                }
                Err(e) => tracing::warn!(error = %e, "config reload failed"),
            }
        }
    });

    Some(watcher)
}
