// SPDX-License-Identifier: MIT

//! Persistence root layout and config file loading (spec §6, SPEC_FULL §10.3).
//!
//! Grounded on the teacher's `daemon::lifecycle::Config::load`: a single
//! fixed-path struct resolved once at startup, no builder.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine home directory")]
    NoHomeDir,
    #[error("io error reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config.toml: {0}")]
    Malformed(#[from] toml::de::Error),
}

/// `max_concurrent`/`default_timeout_seconds`/`retention_hours` as read from
/// `~/.spindle/config.toml`; absent keys fall back to spec.md's stated
/// defaults (15, none, 24h).
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    max_concurrent: Option<usize>,
    default_timeout_seconds: Option<u64>,
    retention_hours: Option<u64>,
}

pub const DEFAULT_CEILING: usize = 15;
pub const DEFAULT_RETENTION_HOURS: u64 = 24;

#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (default `~/.spindle`, overridable via `SPINDLE_DIR`).
    pub state_dir: PathBuf,
    pub spools_dir: PathBuf,
    pub shards_dir: PathBuf,
    pub log_path: PathBuf,
    pub pid_path: PathBuf,
    pub reload_signal_path: PathBuf,
    pub max_concurrent: Option<usize>,
    pub default_timeout_seconds: Option<u64>,
    pub retention_hours: u64,
}

impl Config {
    /// Resolve paths and read `config.toml`, per spec.md §6's `SPINDLE_DIR`
    /// override and SPEC_FULL §10.3's config-file supplement.
    pub fn load() -> Result<Self, ConfigError> {
        let state_dir = match std::env::var_os("SPINDLE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir().ok_or(ConfigError::NoHomeDir)?.join(".spindle"),
        };

        let config_path = state_dir.join("config.toml");
        let file_config = if config_path.exists() {
            let raw = std::fs::read_to_string(&config_path)?;
            toml::from_str(&raw)?
        } else {
            FileConfig::default()
        };

        Ok(Self {
            spools_dir: state_dir.join("spools"),
            shards_dir: state_dir.join("shards"),
            log_path: state_dir.join("spindle.log"),
            pid_path: state_dir.join("spindle.pid"),
            reload_signal_path: state_dir.join("reload_signal"),
            state_dir,
            max_concurrent: file_config.max_concurrent,
            default_timeout_seconds: file_config.default_timeout_seconds,
            retention_hours: file_config.retention_hours.unwrap_or(DEFAULT_RETENTION_HOURS),
        })
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.spools_dir)?;
        std::fs::create_dir_all(&self.shards_dir)?;
        if !self.reload_signal_path.exists() {
            std::fs::write(&self.reload_signal_path, b"")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
