// SPDX-License-Identifier: MIT

//! Structured logging setup, grounded on the teacher's
//! `daemon::main::setup_logging`: a rolling file appender plus an
//! `EnvFilter` read from `SPINDLE_LOG`, falling back to `RUST_LOG`, then
//! `info` (SPEC_FULL §6).

use crate::config::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn setup_logging(config: &Config) -> std::io::Result<tracing_appender::non_blocking::WorkerGuard> {
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_name = config
        .log_path
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("spindle.log"));
    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().unwrap_or(&config.state_dir),
        file_name,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = std::env::var("SPINDLE_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
