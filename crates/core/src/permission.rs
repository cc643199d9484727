// SPDX-License-Identifier: MIT

//! Permission profiles and the harness-specific policy they expand to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse permission profile requested for a spool.
///
/// Adapters translate this into harness-specific flags (allowed-tools
/// strings for Claude, sandbox flags for Codex) — see
/// `spindle_adapters::harness`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ReadOnly,
    Careful,
    Full,
    Shard,
    CarefulShard,
}

impl Permission {
    /// Whether this profile implies running inside an isolated shard
    /// (worktree), independent of whether the caller also asked for one
    /// explicitly via `shard: true`.
    pub fn implies_shard(&self) -> bool {
        matches!(self, Permission::Shard | Permission::CarefulShard)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ReadOnly => "readonly",
            Permission::Careful => "careful",
            Permission::Full => "full",
            Permission::Shard => "shard",
            Permission::CarefulShard => "careful+shard",
        }
    }
}

impl Default for Permission {
    fn default() -> Self {
        Permission::Careful
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "readonly" | "read-only" | "read_only" => Ok(Permission::ReadOnly),
            "careful" => Ok(Permission::Careful),
            "full" => Ok(Permission::Full),
            "shard" => Ok(Permission::Shard),
            "careful+shard" | "careful_shard" => Ok(Permission::CarefulShard),
            other => Err(format!("invalid permission: {other}")),
        }
    }
}
