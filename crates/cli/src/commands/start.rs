// SPDX-License-Identifier: MIT

//! `spindle start`: launch `spindled` detached and record its pid.

use crate::process;
use spindle_mcp::Config;

pub fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.ensure_dirs()?;

    if let Ok(pid) = process::read_pid(&config) {
        if process::is_alive(pid) {
            println!("spindled already running (pid {pid})");
            return Ok(());
        }
    }

    let pid = process::start_detached(&config)?;
    println!("spindled started (pid {pid})");
    Ok(())
}
