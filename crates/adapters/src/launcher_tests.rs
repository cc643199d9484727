use super::*;
use spindle_core::SpoolId;
use tempfile::tempdir;

#[tokio::test]
async fn spawn_redirects_stdio_and_returns_a_live_pid() {
    let dir = tempdir().unwrap();
    let stdout_path = dir.path().join("out.log");
    let stderr_path = dir.path().join("err.log");

    let launcher = ProcessLauncher::new();
    let argv = Argv::new("sh").arg("-c").arg("echo hello; sleep 0.2");
    let pid = launcher
        .spawn(
            &SpoolId::new("s1"),
            &argv,
            &stdout_path,
            &stderr_path,
            None,
            None,
        )
        .await
        .unwrap();

    assert!(pid > 0);
    assert!(ProcessLauncher::is_alive(pid));

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(!ProcessLauncher::is_alive(pid));
    ProcessLauncher::reap(pid);

    let output = std::fs::read_to_string(&stdout_path).unwrap();
    assert!(output.contains("hello"));
}

#[tokio::test]
async fn watchdog_deadline_elapses_after_timeout() {
    let launcher = ProcessLauncher::new();
    let id = SpoolId::new("timed");
    let dir = tempdir().unwrap();
    let argv = Argv::new("sleep").arg("5");
    launcher
        .spawn(
            &id,
            &argv,
            &dir.path().join("out"),
            &dir.path().join("err"),
            None,
            Some(0),
        )
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(launcher.deadline_elapsed(&id));

    launcher.clear_watchdog(&id);
    assert!(!launcher.deadline_elapsed(&id));
}

#[test]
fn cancellation_flag_is_consumed_once() {
    let launcher = ProcessLauncher::new();
    let id = SpoolId::new("cancel-me");
    assert!(!launcher.take_cancelled(&id));

    launcher.request_cancel(&id);
    assert!(launcher.take_cancelled(&id));
    assert!(!launcher.take_cancelled(&id));
}

#[tokio::test]
async fn terminate_stops_a_long_running_child() {
    let dir = tempdir().unwrap();
    let launcher = ProcessLauncher::new();
    let argv = Argv::new("sleep").arg("30");
    let pid = launcher
        .spawn(
            &SpoolId::new("term-me"),
            &argv,
            &dir.path().join("out"),
            &dir.path().join("err"),
            None,
            None,
        )
        .await
        .unwrap();

    assert!(ProcessLauncher::is_alive(pid));
    ProcessLauncher::terminate(pid).await;
    assert!(!ProcessLauncher::is_alive(pid));
}
