// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! spindle-mcp: the MCP transport boundary (spec §6) over
//! [`spindle_engine::Supervisor`] — configuration, logging, the tool
//! surface, and the `spindled` binary that serves it.

pub mod config;
pub mod logging;
pub mod runtime;
pub mod server;
pub mod tools;

pub use config::Config;
pub use server::SpindleServer;
pub use tools::{SpindleTools, ToolError};
