// SPDX-License-Identifier: MIT

//! `spindle`: the thin CLI wrapping `spindled` (start/reload/status/serve).

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod color;
mod commands;
mod process;
mod table;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "spindle", version, about = "Delegation server for child coding-agent harnesses")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Launch spindled detached and record its pid.
    Start,
    /// Signal a running spindled to reload its config file.
    Reload,
    /// Print the current dashboard as a table.
    Status,
    /// Run the MCP server in the foreground.
    Serve {
        /// Serve over HTTP/SSE at this address instead of stdio.
        #[arg(long)]
        http: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Start => commands::start::run(),
        Command::Reload => commands::reload::run(),
        Command::Status => commands::status::run().await,
        Command::Serve { http } => commands::serve::run(http).await,
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
