// SPDX-License-Identifier: MIT

//! Isolated-workspace lifecycle (spec §4.C5): a shard is a git worktree
//! cut onto its own branch. Generalized from the teacher's plain-directory
//! `Effect::CreateWorkspace`/`Effect::DeleteWorkspace` handling into a git
//! worktree primitive: same "best-effort remove, then clean the directory"
//! shape, but backed by `git worktree` rather than a bare `mkdir`.

use crate::error::AdapterError;
use parking_lot::Mutex as SyncMutex;
use serde::Serialize;
use spindle_core::{Shard, ShardId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::Mutex;

/// Result of `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShardStatus {
    pub branch: String,
    pub worktree_exists: bool,
    pub clean: bool,
    pub ahead_by: u32,
    pub behind_by: u32,
}

/// Result of a successful `merge`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeResult {
    pub merged_commits: u32,
    pub conflicts: Option<String>,
}

/// Creates, inspects, merges, and tears down per-spool git worktrees.
/// Worktree mutations against the same repository root are serialized
/// behind a per-root async lock (spec §5: "serialized per repository
/// root"), since concurrent `git worktree add`/`remove` on one repo race on
/// `.git/worktrees/`.
pub struct ShardManager {
    repo_locks: SyncMutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl Default for ShardManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShardManager {
    pub fn new() -> Self {
        Self {
            repo_locks: SyncMutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, repo_root: &Path) -> Arc<Mutex<()>> {
        let canonical = repo_root
            .canonicalize()
            .unwrap_or_else(|_| repo_root.to_path_buf());
        self.repo_locks
            .lock()
            .entry(canonical)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Cut a new worktree at `<shards_root>/<spool_id>-<short>` on branch
    /// `shard-<spool_id>-<short>`, forked from `base_branch`.
    pub async fn allocate(
        &self,
        repo_root: &Path,
        shards_root: &Path,
        spool_id: &spindle_core::SpoolId,
        base_branch: &str,
        id_gen: &dyn spindle_core::IdGen,
    ) -> Result<Shard, AdapterError> {
        let lock = self.lock_for(repo_root);
        let _guard = lock.lock().await;

        let short = id_gen.next_hex(6);
        let worktree_path = shards_root.join(format!("{}-{}", spool_id, short));
        let branch_name = format!("shard-{}-{}", spool_id, short);

        tokio::fs::create_dir_all(shards_root).await?;

        let output = Command::new("git")
            .arg("worktree")
            .arg("add")
            .arg("-b")
            .arg(&branch_name)
            .arg(&worktree_path)
            .arg(base_branch)
            .current_dir(repo_root)
            .output()
            .await?;

        if !output.status.success() {
            return Err(AdapterError::WorktreeFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(Shard::new(
            ShardId::new(format!("{}-{}", spool_id, short)),
            worktree_path,
            branch_name,
            repo_root.to_path_buf(),
        ))
    }

    pub async fn status(
        &self,
        repo_root: &Path,
        shard: &Shard,
        base_branch: &str,
    ) -> Result<ShardStatus, AdapterError> {
        let worktree_exists = tokio::fs::try_exists(&shard.worktree_path)
            .await
            .unwrap_or(false);
        if !worktree_exists {
            return Ok(ShardStatus {
                branch: shard.branch_name.clone(),
                worktree_exists: false,
                clean: true,
                ahead_by: 0,
                behind_by: 0,
            });
        }

        let porcelain = Command::new("git")
            .arg("status")
            .arg("--porcelain")
            .current_dir(&shard.worktree_path)
            .output()
            .await?;
        let clean = porcelain.status.success() && porcelain.stdout.is_empty();

        let range = format!("{}...{}", base_branch, shard.branch_name);
        let counts = Command::new("git")
            .arg("rev-list")
            .arg("--left-right")
            .arg("--count")
            .arg(&range)
            .current_dir(repo_root)
            .output()
            .await?;
        let (behind_by, ahead_by) = if counts.status.success() {
            parse_left_right_count(&String::from_utf8_lossy(&counts.stdout))
        } else {
            (0, 0)
        };

        Ok(ShardStatus {
            branch: shard.branch_name.clone(),
            worktree_exists: true,
            clean,
            ahead_by,
            behind_by,
        })
    }

    /// Merge the shard's branch into `base_branch` with an explicit merge
    /// commit. On conflict, aborts the merge and reports the conflict
    /// description without completing.
    pub async fn merge(
        &self,
        repo_root: &Path,
        shard: &Shard,
        base_branch: &str,
    ) -> Result<MergeResult, AdapterError> {
        let lock = self.lock_for(repo_root);
        let _guard = lock.lock().await;

        let before = Command::new("git")
            .arg("rev-parse")
            .arg(base_branch)
            .current_dir(repo_root)
            .output()
            .await?;
        let before_sha = String::from_utf8_lossy(&before.stdout).trim().to_string();

        let merge = Command::new("git")
            .arg("merge")
            .arg("--no-ff")
            .arg("-m")
            .arg(format!("Merge shard {}", shard.branch_name))
            .arg(&shard.branch_name)
            .current_dir(repo_root)
            .output()
            .await?;

        if !merge.status.success() {
            let conflict = String::from_utf8_lossy(&merge.stdout).to_string()
                + &String::from_utf8_lossy(&merge.stderr);
            let _ = Command::new("git")
                .arg("merge")
                .arg("--abort")
                .current_dir(repo_root)
                .output()
                .await;
            return Ok(MergeResult {
                merged_commits: 0,
                conflicts: Some(conflict.trim().to_string()),
            });
        }

        let count = Command::new("git")
            .arg("rev-list")
            .arg("--count")
            .arg(format!("{}..HEAD", before_sha))
            .current_dir(repo_root)
            .output()
            .await?;
        let merged_commits = String::from_utf8_lossy(&count.stdout)
            .trim()
            .parse()
            .unwrap_or(0);

        Ok(MergeResult {
            merged_commits,
            conflicts: None,
        })
    }

    /// Remove the worktree (best-effort, same shape as the teacher's
    /// workspace-delete handler: `git worktree remove --force` then clean
    /// up any remnant directory), optionally deleting the branch too.
    pub async fn abandon(
        &self,
        repo_root: &Path,
        shard: &Shard,
        keep_branch: bool,
    ) -> Result<(), AdapterError> {
        let lock = self.lock_for(repo_root);
        let _guard = lock.lock().await;

        let _ = Command::new("git")
            .arg("worktree")
            .arg("remove")
            .arg("--force")
            .arg(&shard.worktree_path)
            .current_dir(repo_root)
            .output()
            .await;

        if tokio::fs::try_exists(&shard.worktree_path)
            .await
            .unwrap_or(false)
        {
            tokio::fs::remove_dir_all(&shard.worktree_path).await?;
        }

        if !keep_branch {
            let _ = Command::new("git")
                .arg("branch")
                .arg("-D")
                .arg(&shard.branch_name)
                .current_dir(repo_root)
                .output()
                .await;
        }

        Ok(())
    }
}

/// Parse `git rev-list --left-right --count` output (`"<behind>\t<ahead>"`).
fn parse_left_right_count(raw: &str) -> (u32, u32) {
    let mut parts = raw.trim().split_whitespace();
    let behind = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
    let ahead = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
    (behind, ahead)
}

#[cfg(test)]
#[path = "shard_manager_tests.rs"]
mod tests;
