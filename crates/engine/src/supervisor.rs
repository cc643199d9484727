// SPDX-License-Identifier: MIT

//! The Tool Surface (C10): a single object tying the Store, Gate, Adapters,
//! Launcher, Monitor, Shard Manager, and Wait Coordinator together and
//! exposing exactly the eleven operations a transport needs.

use crate::error::SupervisorError;
use crate::gate::ConcurrencyGate;
use crate::monitor::{Dashboard, Monitor};
use crate::resumer;
use crate::spawn::{self, NewSpool};
use crate::wait::{default_wait_timeout, WaitCoordinator};
use spindle_adapters::{adapter_for, MergeResult, ProcessLauncher, ShardManager, ShardStatus};
use spindle_core::{parse_tags, Clock, HarnessKind, IdGen, Permission, Spool, SpoolId};
use spindle_store::SpoolStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Arguments to `spin`, mirroring spec.md §4.C10's operation signature.
/// Harness/permission are taken as raw strings and parsed here so that an
/// invalid value is an admission error, not a transport-layer panic.
pub struct SpinRequest {
    pub prompt: String,
    pub harness: Option<String>,
    pub permission: Option<String>,
    pub shard: bool,
    pub system_prompt: Option<String>,
    pub working_dir: Option<PathBuf>,
    pub allowed_tools: Option<String>,
    pub tags: Option<String>,
    pub model: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// How `spin_wait` should collect results.
pub enum WaitMode {
    Gather,
    Stream,
}

/// What `spin_wait` hands back, depending on `WaitMode`.
pub enum WaitOutcome {
    Gathered(Vec<Spool>),
    Streamed(mpsc::Receiver<Spool>),
}

pub struct Supervisor {
    store: Arc<dyn SpoolStore>,
    gate: Arc<ConcurrencyGate>,
    launcher: Arc<ProcessLauncher>,
    shards: Arc<ShardManager>,
    monitor: Arc<Monitor>,
    wait: WaitCoordinator,
    clock: Arc<dyn Clock>,
    id_gen: Arc<dyn IdGen>,
    spools_root: PathBuf,
    shards_root: PathBuf,
}

impl Supervisor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn SpoolStore>,
        launcher: Arc<ProcessLauncher>,
        shards: Arc<ShardManager>,
        clock: Arc<dyn Clock>,
        id_gen: Arc<dyn IdGen>,
        spools_root: PathBuf,
        shards_root: PathBuf,
    ) -> Arc<Self> {
        let gate = Arc::new(ConcurrencyGate::new(store.clone()));
        let monitor = Arc::new(Monitor::new(
            store.clone(),
            launcher.clone(),
            gate.clone(),
            clock.clone(),
            id_gen.clone(),
            spools_root.clone(),
        ));
        let wait = WaitCoordinator::new(store.clone());
        Arc::new(Self {
            store,
            gate,
            launcher,
            shards,
            monitor,
            wait,
            clock,
            id_gen,
            spools_root,
            shards_root,
        })
    }

    /// Start the background reaper. Call once per process.
    pub fn start_monitor(&self) -> tokio::task::JoinHandle<()> {
        self.monitor.clone().spawn_task()
    }

    /// Run one reaper pass synchronously, without the 1s interval loop.
    /// Used by tests that need a deterministic tick rather than a real-time
    /// wait on the background task.
    pub async fn tick_once(&self) {
        self.monitor.tick().await
    }

    /// Swap in a new admission ceiling, e.g. after `spindle reload` picks
    /// up an edited `config.toml`. Has no effect when
    /// `SPINDLE_MAX_CONCURRENT` is set, since that env var takes
    /// precedence at the call site that computes the new value.
    pub fn set_concurrency_ceiling(&self, ceiling: usize) {
        self.gate.set_ceiling(ceiling);
    }

    pub async fn spin(&self, req: SpinRequest) -> Result<SpoolId, SupervisorError> {
        let harness = match req.harness.as_deref() {
            Some(h) => h.parse::<HarnessKind>().map_err(SupervisorError::UnknownHarness)?,
            None => HarnessKind::Claude,
        };
        let permission = match req.permission.as_deref() {
            Some(p) => p.parse::<Permission>().map_err(SupervisorError::InvalidPermission)?,
            None => Permission::default(),
        };

        let id = spawn::mint_id(self.id_gen.as_ref(), harness);
        let mut working_dir = req.working_dir.clone();
        let mut shard = None;

        if req.shard || permission.implies_shard() {
            let repo_root = working_dir
                .clone()
                .ok_or(SupervisorError::MissingField("working_dir"))?;
            let base_branch = current_branch(&repo_root).await;
            let allocated = self
                .shards
                .allocate(&repo_root, &self.shards_root, &id, &base_branch, self.id_gen.as_ref())
                .await?;
            working_dir = Some(allocated.worktree_path.clone());
            shard = Some(allocated);
        }

        let tags = req.tags.as_deref().map(parse_tags).unwrap_or_default();
        let (stdout_path, stderr_path) = spawn::output_paths(&self.spools_root, &id);

        let mut draft = Spool::new_pending(
            id.clone(),
            harness,
            req.prompt.clone(),
            permission,
            stdout_path.clone(),
            stderr_path.clone(),
            self.clock.now(),
        );
        draft.system_prompt = req.system_prompt.clone();
        draft.working_dir = working_dir.clone();
        draft.allowed_tools = req.allowed_tools.clone();
        draft.model = req.model.clone();
        draft.tags = tags.clone();
        draft.timeout_seconds = req.timeout_seconds;
        draft.shard = shard.clone();

        let adapter = adapter_for(harness);
        let argv = spawn::build_command(adapter.as_ref(), &draft)?;

        let spec = NewSpool {
            harness,
            prompt: req.prompt,
            system_prompt: req.system_prompt,
            permission,
            working_dir,
            allowed_tools: req.allowed_tools,
            model: req.model,
            sandbox: None,
            tags,
            timeout_seconds: req.timeout_seconds,
            retry_of: None,
            shard,
        };

        let spool = spawn::admit_build_and_spawn(
            &self.gate,
            self.store.as_ref(),
            &self.launcher,
            self.clock.as_ref(),
            id,
            spec,
            argv,
            stdout_path,
            stderr_path,
        )
        .await?;
        Ok(spool.id)
    }

    pub fn unspool(&self, id: &SpoolId) -> Result<Spool, SupervisorError> {
        Ok(self.store.get(id)?)
    }

    pub fn spools(&self) -> Result<Vec<Spool>, SupervisorError> {
        Ok(self.store.list()?)
    }

    pub async fn spin_wait(
        &self,
        ids: Vec<SpoolId>,
        mode: WaitMode,
        timeout: Option<Duration>,
    ) -> WaitOutcome {
        let deadline = timeout.unwrap_or_else(default_wait_timeout);
        match mode {
            WaitMode::Gather => WaitOutcome::Gathered(self.wait.gather(&ids, deadline).await),
            WaitMode::Stream => {
                let (tx, rx) = mpsc::channel(ids.len().max(1));
                let wait = WaitCoordinator::new(self.store.clone());
                tokio::spawn(async move {
                    wait.stream(&ids, deadline, tx).await;
                });
                WaitOutcome::Streamed(rx)
            }
        }
    }

    pub async fn respin(&self, session_id: &str, prompt: &str) -> Result<SpoolId, SupervisorError> {
        let original = resumer::find_by_session(self.store.as_ref(), session_id)?;
        let adapter = adapter_for(original.harness);
        let argv = resumer::build_resume_argv(adapter.as_ref(), session_id, prompt)?;

        let id = spawn::mint_id(self.id_gen.as_ref(), original.harness);
        let (stdout_path, stderr_path) = spawn::output_paths(&self.spools_root, &id);
        let spec = NewSpool {
            harness: original.harness,
            prompt: prompt.to_string(),
            system_prompt: original.system_prompt.clone(),
            permission: original.permission,
            working_dir: original.working_dir.clone(),
            allowed_tools: original.allowed_tools.clone(),
            model: original.model.clone(),
            sandbox: original.sandbox.clone(),
            tags: original.tags.clone(),
            timeout_seconds: original.timeout_seconds,
            retry_of: Some(original.id.clone()),
            shard: None,
        };

        let spool = spawn::admit_build_and_spawn(
            &self.gate,
            self.store.as_ref(),
            &self.launcher,
            self.clock.as_ref(),
            id,
            spec,
            argv,
            stdout_path,
            stderr_path,
        )
        .await?;
        Ok(spool.id)
    }

    /// Requests termination; the terminal state becomes visible after the
    /// Monitor's next tick. A no-op on an already-terminal spool.
    pub fn spin_drop(&self, id: &SpoolId) -> Result<(), SupervisorError> {
        let spool = self.store.get(id)?;
        if !spool.status.is_terminal() {
            self.launcher.request_cancel(id);
        }
        Ok(())
    }

    pub fn spool_peek(&self, id: &SpoolId, lines: Option<usize>) -> Result<String, SupervisorError> {
        self.monitor.peek(id, lines.unwrap_or(50))
    }

    /// Re-spawn the same prompt/configuration as a brand-new spool linked to
    /// the original via `retry_of`, independent of session continuation.
    pub async fn spool_retry(&self, id: &SpoolId) -> Result<SpoolId, SupervisorError> {
        let original = self.store.get(id)?;
        let adapter = adapter_for(original.harness);

        let new_id = spawn::mint_id(self.id_gen.as_ref(), original.harness);
        let (stdout_path, stderr_path) = spawn::output_paths(&self.spools_root, &new_id);

        let mut draft = original.clone();
        draft.id = new_id.clone();
        draft.stdout_path = stdout_path.clone();
        draft.stderr_path = stderr_path.clone();
        let argv = spawn::build_command(adapter.as_ref(), &draft)?;

        let spec = NewSpool {
            harness: original.harness,
            prompt: original.prompt.clone(),
            system_prompt: original.system_prompt.clone(),
            permission: original.permission,
            working_dir: original.working_dir.clone(),
            allowed_tools: original.allowed_tools.clone(),
            model: original.model.clone(),
            sandbox: original.sandbox.clone(),
            tags: original.tags.clone(),
            timeout_seconds: original.timeout_seconds,
            retry_of: Some(original.id.clone()),
            shard: None,
        };

        let spool = spawn::admit_build_and_spawn(
            &self.gate,
            self.store.as_ref(),
            &self.launcher,
            self.clock.as_ref(),
            new_id,
            spec,
            argv,
            stdout_path,
            stderr_path,
        )
        .await?;
        Ok(spool.id)
    }

    pub async fn shard_status(&self, id: &SpoolId) -> Result<ShardStatus, SupervisorError> {
        let spool = self.store.get(id)?;
        let shard = spool.shard.ok_or(SupervisorError::MissingField("shard"))?;
        Ok(self
            .shards
            .status(&shard.repo_root, &shard, &current_branch(&shard.repo_root).await)
            .await?)
    }

    pub async fn shard_merge(&self, id: &SpoolId, keep_branch: bool) -> Result<MergeResult, SupervisorError> {
        let spool = self.store.get(id)?;
        let shard = spool.shard.ok_or(SupervisorError::MissingField("shard"))?;
        let base_branch = current_branch(&shard.repo_root).await;
        let result = self.shards.merge(&shard.repo_root, &shard, &base_branch).await?;
        if result.conflicts.is_none() && !keep_branch {
            self.shards.abandon(&shard.repo_root, &shard, keep_branch).await?;
        }
        Ok(result)
    }

    pub async fn shard_abandon(&self, id: &SpoolId, keep_branch: bool) -> Result<(), SupervisorError> {
        let spool = self.store.get(id)?;
        let shard = spool.shard.ok_or(SupervisorError::MissingField("shard"))?;
        Ok(self.shards.abandon(&shard.repo_root, &shard, keep_branch).await?)
    }

    pub fn dashboard(&self) -> Result<Dashboard, SupervisorError> {
        self.monitor.dashboard()
    }
}

/// Resolve the current branch of a repository, falling back to `"main"`
/// when it cannot be determined (detached HEAD, not a repo, `git` missing).
async fn current_branch(repo_root: &std::path::Path) -> String {
    tokio::process::Command::new("git")
        .arg("rev-parse")
        .arg("--abbrev-ref")
        .arg("HEAD")
        .current_dir(repo_root)
        .output()
        .await
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|s| !s.is_empty() && s != "HEAD")
        .unwrap_or_else(|| "main".to_string())
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
