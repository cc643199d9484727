// SPDX-License-Identifier: MIT

//! The admit-build-spawn-persist sequence shared by fresh admission
//! ([`crate::supervisor::Supervisor::spin`]), session continuation, and the
//! Monitor Loop's expired-session fallback. Centralizing it keeps a single
//! writer of "how a new running spool comes into existence".

use crate::error::SupervisorError;
use crate::gate::ConcurrencyGate;
use spindle_adapters::{Argv, HarnessAdapter, ProcessLauncher};
use spindle_core::{Clock, HarnessKind, IdGen, Permission, Shard, Spool, SpoolId};
use spindle_store::SpoolStore;
use std::path::{Path, PathBuf};

/// Everything needed to mint one new spool record, short of the argv
/// itself (built by the caller from the harness adapter, since the
/// argument shape differs for a fresh spawn, a resume, or a fallback).
pub struct NewSpool {
    pub harness: HarnessKind,
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub permission: Permission,
    pub working_dir: Option<PathBuf>,
    pub allowed_tools: Option<String>,
    pub model: Option<String>,
    pub sandbox: Option<String>,
    pub tags: Vec<String>,
    pub timeout_seconds: Option<u64>,
    pub retry_of: Option<SpoolId>,
    pub shard: Option<Shard>,
}

#[allow(clippy::too_many_arguments)]
pub async fn admit_build_and_spawn(
    gate: &ConcurrencyGate,
    store: &dyn SpoolStore,
    launcher: &ProcessLauncher,
    clock: &dyn Clock,
    id: SpoolId,
    spec: NewSpool,
    argv: Argv,
    stdout_path: PathBuf,
    stderr_path: PathBuf,
) -> Result<Spool, SupervisorError> {
    let permit = gate.try_admit().await?;

    let mut spool = Spool::new_pending(
        id,
        spec.harness,
        spec.prompt,
        spec.permission,
        stdout_path.clone(),
        stderr_path.clone(),
        clock.now(),
    );
    spool.system_prompt = spec.system_prompt;
    spool.working_dir = spec.working_dir.clone();
    spool.allowed_tools = spec.allowed_tools;
    spool.model = spec.model;
    spool.sandbox = spec.sandbox;
    spool.tags = spec.tags;
    spool.timeout_seconds = spec.timeout_seconds;
    spool.retry_of = spec.retry_of;
    spool.shard = spec.shard;

    let pid = launcher
        .spawn(
            &spool.id,
            &argv,
            &stdout_path,
            &stderr_path,
            spec.working_dir.as_deref(),
            spec.timeout_seconds,
        )
        .await?;

    spool.mark_running(pid, clock.now());
    store.put(&spool)?;
    drop(permit);

    tracing::info!(spool_id = %spool.id, harness = %spool.harness, pid, "spool admitted and spawned");
    Ok(spool)
}

/// Where a spool's output sinks live: `<root>/<id>.stdout` / `.stderr`,
/// per spec §6's persisted layout.
pub fn output_paths(root: &Path, id: &SpoolId) -> (PathBuf, PathBuf) {
    (
        root.join(format!("{}.stdout", id.as_str())),
        root.join(format!("{}.stderr", id.as_str())),
    )
}

/// Resolve the `Argv` for an adapter-specific harness, surfacing adapter
/// errors as [`SupervisorError`].
pub fn build_command(adapter: &dyn HarnessAdapter, spool: &Spool) -> Result<Argv, SupervisorError> {
    Ok(adapter.build_command(spool)?)
}

/// Mint a fresh spool id, applying the harness's id prefix convention
/// (spec §4.C2: Codex ids are prefixed `codex-<hex>`).
pub fn mint_id(id_gen: &dyn IdGen, harness: HarnessKind) -> SpoolId {
    let hex = id_gen.next_hex(16);
    match harness.id_prefix() {
        Some(prefix) => SpoolId::new(format!("{prefix}-{hex}")),
        None => SpoolId::new(hex),
    }
}
