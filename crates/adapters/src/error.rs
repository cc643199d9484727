// SPDX-License-Identifier: MIT

//! Errors from harness adapters, the process launcher, and the shard manager.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("unknown harness: {0}")]
    UnknownHarness(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("harness binary not found on PATH: {0}")]
    BinaryNotFound(String),
    #[error("failed to spawn child process: {0}")]
    SpawnFailed(String),
    #[error("could not parse harness output")]
    UnparseableOutput,
    #[error("worktree allocation failed: {0}")]
    WorktreeFailed(String),
    #[error("shard merge conflict: {0}")]
    MergeConflict(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
