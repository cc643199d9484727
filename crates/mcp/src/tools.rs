// SPDX-License-Identifier: MIT

//! `SpindleTools`: the eleven operations of spec.md §4.C10, as plain async
//! methods over an `Arc<Supervisor>`. `spindle-mcp`'s server module is the
//! only thing that knows these are exposed over MCP; this module is
//! transport-agnostic.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use spindle_adapters::{MergeResult, ShardStatus};
use spindle_core::{Spool, SpoolId};
use spindle_engine::{SpinRequest, Supervisor, SupervisorError, WaitMode, WaitOutcome};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// The boundary error type returned to the transport (spec.md §7,
/// SPEC_FULL §7): carries enough detail for a useful tool-error payload
/// without leaking internal adapter/store variants — a `Display` string is
/// all `rmcp` needs.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SpinArgs {
    pub prompt: String,
    #[serde(default)]
    pub harness: Option<String>,
    #[serde(default)]
    pub permission: Option<String>,
    #[serde(default)]
    pub shard: bool,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    #[serde(default)]
    pub allowed_tools: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl From<SpinArgs> for SpinRequest {
    fn from(args: SpinArgs) -> Self {
        SpinRequest {
            prompt: args.prompt,
            harness: args.harness,
            permission: args.permission,
            shard: args.shard,
            system_prompt: args.system_prompt,
            working_dir: args.working_dir,
            allowed_tools: args.allowed_tools,
            tags: args.tags,
            model: args.model,
            timeout_seconds: args.timeout_seconds,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SpinResult {
    pub spool_id: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SpoolIdArgs {
    pub spool_id: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SpinWaitArgs {
    pub spool_ids: Vec<String>,
    /// `"gather"` (default) waits for all and returns them together;
    /// `"stream"` returns them in arrival order as each finishes.
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpinWaitResult {
    pub records: Vec<Spool>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RespinArgs {
    pub session_id: String,
    pub prompt: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SpoolPeekArgs {
    pub spool_id: String,
    #[serde(default)]
    pub lines: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpoolPeekResult {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ShardOpArgs {
    pub spool_id: String,
    #[serde(default)]
    pub keep_branch: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub pending: usize,
    pub running: usize,
    pub complete: usize,
    pub error: usize,
    pub timeout: usize,
    pub killed: usize,
    pub needs_attention: Vec<String>,
}

/// Thin wrapper over `Arc<Supervisor>` exposing spec.md §4.C10's operation
/// set as plain async methods returning `Result<T, ToolError>`.
pub struct SpindleTools {
    supervisor: Arc<Supervisor>,
}

impl SpindleTools {
    pub fn new(supervisor: Arc<Supervisor>) -> Self {
        Self { supervisor }
    }

    pub async fn spin(&self, args: SpinArgs) -> Result<SpinResult, ToolError> {
        let id = self.supervisor.spin(args.into()).await?;
        Ok(SpinResult { spool_id: id.as_str().to_string() })
    }

    pub fn unspool(&self, args: SpoolIdArgs) -> Result<Spool, ToolError> {
        Ok(self.supervisor.unspool(&SpoolId::new(args.spool_id))?)
    }

    pub fn spools(&self) -> Result<Vec<Spool>, ToolError> {
        Ok(self.supervisor.spools()?)
    }

    pub async fn spin_wait(&self, args: SpinWaitArgs) -> Result<SpinWaitResult, ToolError> {
        let ids: Vec<SpoolId> = args.spool_ids.into_iter().map(SpoolId::new).collect();
        let timeout = args.timeout_seconds.map(Duration::from_secs);
        let mode = match args.mode.as_deref() {
            Some("stream") => WaitMode::Stream,
            _ => WaitMode::Gather,
        };
        let records = match self.supervisor.spin_wait(ids, mode, timeout).await {
            WaitOutcome::Gathered(records) => records,
            WaitOutcome::Streamed(mut rx) => {
                let mut records = Vec::new();
                while let Some(record) = rx.recv().await {
                    records.push(record);
                }
                records
            }
        };
        Ok(SpinWaitResult { records })
    }

    pub async fn respin(&self, args: RespinArgs) -> Result<SpinResult, ToolError> {
        let id = self.supervisor.respin(&args.session_id, &args.prompt).await?;
        Ok(SpinResult { spool_id: id.as_str().to_string() })
    }

    pub fn spin_drop(&self, args: SpoolIdArgs) -> Result<(), ToolError> {
        Ok(self.supervisor.spin_drop(&SpoolId::new(args.spool_id))?)
    }

    pub fn spool_peek(&self, args: SpoolPeekArgs) -> Result<SpoolPeekResult, ToolError> {
        let text = self.supervisor.spool_peek(&SpoolId::new(args.spool_id), args.lines)?;
        Ok(SpoolPeekResult { text })
    }

    pub async fn spool_retry(&self, args: SpoolIdArgs) -> Result<SpinResult, ToolError> {
        let id = self.supervisor.spool_retry(&SpoolId::new(args.spool_id)).await?;
        Ok(SpinResult { spool_id: id.as_str().to_string() })
    }

    pub async fn shard_status(&self, args: SpoolIdArgs) -> Result<ShardStatus, ToolError> {
        Ok(self.supervisor.shard_status(&SpoolId::new(args.spool_id)).await?)
    }

    pub async fn shard_merge(&self, args: ShardOpArgs) -> Result<MergeResult, ToolError> {
        Ok(self
            .supervisor
            .shard_merge(&SpoolId::new(args.spool_id), args.keep_branch)
            .await?)
    }

    pub async fn shard_abandon(&self, args: ShardOpArgs) -> Result<(), ToolError> {
        Ok(self
            .supervisor
            .shard_abandon(&SpoolId::new(args.spool_id), args.keep_branch)
            .await?)
    }

    pub fn dashboard(&self) -> Result<DashboardView, ToolError> {
        let dashboard = self.supervisor.dashboard()?;
        Ok(DashboardView {
            pending: dashboard.counts.pending,
            running: dashboard.counts.running,
            complete: dashboard.counts.complete,
            error: dashboard.counts.error,
            timeout: dashboard.counts.timeout,
            killed: dashboard.counts.killed,
            needs_attention: dashboard
                .needs_attention
                .into_iter()
                .map(|id| id.as_str().to_string())
                .collect(),
        })
    }
}

#[cfg(test)]
#[path = "tools_tests.rs"]
mod tests;
