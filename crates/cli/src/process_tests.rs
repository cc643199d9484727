use super::*;
use serial_test::serial;
use tempfile::tempdir;

fn test_config(dir: &std::path::Path) -> Config {
    std::env::set_var("SPINDLE_DIR", dir);
    let config = Config::load().unwrap();
    std::env::remove_var("SPINDLE_DIR");
    config
}

#[test]
#[serial]
fn read_pid_fails_when_no_pidfile_exists() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let err = read_pid(&config).unwrap_err();
    assert!(matches!(err, ProcessError::NotRunning(_)));
}

#[test]
#[serial]
fn read_pid_returns_the_recorded_value() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    std::fs::write(&config.pid_path, "4242").unwrap();
    assert_eq!(read_pid(&config).unwrap(), 4242);
}

#[test]
fn is_alive_is_true_for_the_current_process() {
    assert!(is_alive(std::process::id()));
}

#[test]
fn is_alive_is_false_for_an_implausible_pid() {
    assert!(!is_alive(i32::MAX as u32 - 1));
}

#[test]
#[serial]
fn touch_reload_signal_creates_the_file() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    touch_reload_signal(&config).unwrap();
    assert!(config.reload_signal_path.exists());
}
