// SPDX-License-Identifier: MIT

//! `spindle reload`: bump `reload_signal`'s mtime so a running `spindled`
//! picks up a `config.toml` edit without a restart.

use crate::process;
use spindle_mcp::Config;

pub fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.ensure_dirs()?;

    match process::read_pid(&config) {
        Ok(pid) if process::is_alive(pid) => {
            process::touch_reload_signal(&config)?;
            println!("reload signaled (pid {pid})");
            Ok(())
        }
        _ => {
            anyhow::bail!("no running spindled to reload");
        }
    }
}
