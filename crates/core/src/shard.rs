// SPDX-License-Identifier: MIT

//! The optional isolated-workspace record attached to a spool.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

crate::define_id! {
    /// Unique identifier for a shard (isolated worktree) instance.
    pub struct ShardId;
}

/// A versioned isolated workspace cut for a single spool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shard {
    pub shard_id: ShardId,
    pub worktree_path: PathBuf,
    pub branch_name: String,
    /// The repository the worktree was cut from; needed by status/merge/
    /// abandon, which operate against this root rather than the worktree
    /// itself.
    pub repo_root: PathBuf,
}

impl Shard {
    pub fn new(shard_id: ShardId, worktree_path: PathBuf, branch_name: String, repo_root: PathBuf) -> Self {
        Self {
            shard_id,
            worktree_path,
            branch_name,
            repo_root,
        }
    }
}
