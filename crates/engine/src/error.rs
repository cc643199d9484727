// SPDX-License-Identifier: MIT

//! Supervisor-level error kinds (spec §7): admission errors and wrapped
//! errors from the layers below.

use spindle_adapters::AdapterError;
use spindle_core::SpoolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("at capacity")]
    AtCapacity,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("no spool found with session id: {0}")]
    UnknownSession(String),
    #[error("spool not found: {0}")]
    SpoolNotFound(String),
    #[error("invalid permission: {0}")]
    InvalidPermission(String),
    #[error("unknown harness: {0}")]
    UnknownHarness(String),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error(transparent)]
    Store(#[from] SpoolError),
}
