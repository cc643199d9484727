// SPDX-License-Identifier: MIT

//! Store/record-level error kinds.

use thiserror::Error;

/// Errors surfaced by the Spool Store and anything working directly with a
/// `Spool` record.
#[derive(Debug, Error)]
pub enum SpoolError {
    #[error("spool not found: {0}")]
    NotFound(String),
    #[error("spool record corrupt: {0}")]
    Corrupt(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
