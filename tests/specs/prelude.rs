//! Shared test helpers for behavioral specifications.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Locate a workspace binary (`spindle`/`spindled`), checking the llvm-cov
/// target directory first so coverage runs still find it.
pub fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }
    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }
    standard
}

/// Create a CLI builder for `spindle` commands.
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

/// Fluent builder for running the `spindle` binary and asserting on its
/// output, the way the teacher's own `CliBuilder` drives `oj`.
pub struct CliBuilder {
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self { args: Vec::new(), envs: Vec::new() }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((key.to_string(), value.as_ref().to_string_lossy().to_string()));
        self
    }

    fn command(self) -> Command {
        let mut cmd = Command::new(binary_path("spindle"));
        cmd.args(&self.args);
        for (key, value) in self.envs {
            cmd.env(key, value);
        }
        cmd
    }

    pub fn passes(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    pub fn fails(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            !output.status.success(),
            "expected command to fail, but it passed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }
}

/// Result of a CLI run for chaining assertions.
pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(expected), "stdout does not contain '{}'\nstdout: {}", expected, stdout);
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = String::from_utf8_lossy(&self.output.stderr).into_owned();
        assert!(stderr.contains(expected), "stderr does not contain '{}'\nstderr: {}", expected, stderr);
        self
    }
}

/// Installs a fake `claude` executable on `PATH` for the duration of a
/// test, restoring the previous `PATH` on drop.
pub struct FakeHarnessOnPath {
    previous: Option<String>,
    _dir: tempfile::TempDir,
}

impl FakeHarnessOnPath {
    pub fn install(script: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("claude");
        std::fs::write(&path, script).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();

        let previous = std::env::var("PATH").ok();
        let new_path = match &previous {
            Some(p) => format!("{}:{}", dir.path().display(), p),
            None => dir.path().display().to_string(),
        };
        std::env::set_var("PATH", new_path);
        Self { previous, _dir: dir }
    }
}

impl Drop for FakeHarnessOnPath {
    fn drop(&mut self) {
        match &self.previous {
            Some(p) => std::env::set_var("PATH", p),
            None => std::env::remove_var("PATH"),
        }
    }
}

/// Installs a fake `spindled` executable on `PATH` for the duration of a
/// test. `spindle start` falls back to a `PATH` lookup for `spindled` when
/// no sibling binary is found next to the `spindle` executable under test,
/// so this stands in for the real daemon without depending on it having
/// been built.
pub struct FakeDaemonOnPath {
    previous: Option<String>,
    _dir: tempfile::TempDir,
}

impl FakeDaemonOnPath {
    pub fn install() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spindled");
        std::fs::write(&path, "#!/bin/sh\nsleep 30\n").unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();

        let previous = std::env::var("PATH").ok();
        let new_path = match &previous {
            Some(p) => format!("{}:{}", dir.path().display(), p),
            None => dir.path().display().to_string(),
        };
        std::env::set_var("PATH", new_path);
        Self { previous, _dir: dir }
    }
}

impl Drop for FakeDaemonOnPath {
    fn drop(&mut self) {
        match &self.previous {
            Some(p) => std::env::set_var("PATH", p),
            None => std::env::remove_var("PATH"),
        }
    }
}
