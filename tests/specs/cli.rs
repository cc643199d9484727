//! Black-box tests for the `spindle` binary's `start`/`reload`/`status`
//! subcommands, driven the way the teacher drives `oj` in its own
//! `specs/cli/*.rs`: spawn the real binary, assert on stdout/stderr/exit
//! code, never reach into process internals.

use crate::prelude::{cli, FakeDaemonOnPath};
use serial_test::serial;
use tempfile::tempdir;

#[test]
#[serial(spindle_dir)]
fn status_with_no_spools_reports_an_empty_dashboard() {
    let root = tempdir().unwrap();

    cli()
        .args(&["status"])
        .env("SPINDLE_DIR", root.path())
        .passes()
        .stdout_has("(no spools)")
        .stdout_has("pending=0");
}

#[test]
#[serial(spindle_dir)]
fn reload_without_a_running_daemon_fails() {
    let root = tempdir().unwrap();

    cli()
        .args(&["reload"])
        .env("SPINDLE_DIR", root.path())
        .fails()
        .stderr_has("no running spindled");
}

#[test]
#[serial(spindle_dir)]
fn start_records_a_pidfile_that_reload_then_finds() {
    let root = tempdir().unwrap();
    let _daemon = FakeDaemonOnPath::install();

    cli()
        .args(&["start"])
        .env("SPINDLE_DIR", root.path())
        .passes()
        .stdout_has("spindled started");

    assert!(root.path().join("spindle.pid").exists());

    cli()
        .args(&["start"])
        .env("SPINDLE_DIR", root.path())
        .passes()
        .stdout_has("already running");

    cli()
        .args(&["reload"])
        .env("SPINDLE_DIR", root.path())
        .passes()
        .stdout_has("reload signaled");
}

#[test]
#[serial(spindle_dir)]
fn serve_with_http_reports_unimplemented() {
    let root = tempdir().unwrap();

    cli()
        .args(&["serve", "--http", "127.0.0.1:9999"])
        .env("SPINDLE_DIR", root.path())
        .fails()
        .stderr_has("not yet implemented");
}
