use super::*;
use spindle_core::{IdGen, OsRngIdGen, SpoolId};
use std::process::Command as StdCommand;
use tempfile::tempdir;

fn run(dir: &Path, args: &[&str]) {
    let status = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .expect("git available");
    assert!(status.success(), "git {:?} failed", args);
}

fn init_repo() -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    run(dir.path(), &["init", "-q", "-b", "main"]);
    run(dir.path(), &["config", "user.email", "test@example.com"]);
    run(dir.path(), &["config", "user.name", "Test"]);
    std::fs::write(dir.path().join("README.md"), "hello\n").unwrap();
    run(dir.path(), &["add", "."]);
    run(dir.path(), &["commit", "-q", "-m", "initial"]);
    dir
}

#[tokio::test]
async fn allocate_creates_a_worktree_on_its_own_branch() {
    let repo = init_repo();
    let manager = ShardManager::new();
    let shards_root = repo.path().join("shards");

    let shard = manager
        .allocate(
            repo.path(),
            &shards_root,
            &SpoolId::new("spool1"),
            "main",
            &OsRngIdGen,
        )
        .await
        .unwrap();

    assert!(shard.worktree_path.exists());
    assert!(shard.branch_name.starts_with("shard-spool1-"));
}

#[tokio::test]
async fn status_reports_clean_worktree_with_no_divergence() {
    let repo = init_repo();
    let manager = ShardManager::new();
    let shards_root = repo.path().join("shards");
    let shard = manager
        .allocate(
            repo.path(),
            &shards_root,
            &SpoolId::new("spool2"),
            "main",
            &OsRngIdGen,
        )
        .await
        .unwrap();

    let status = manager.status(repo.path(), &shard, "main").await.unwrap();
    assert!(status.worktree_exists);
    assert!(status.clean);
    assert_eq!(status.ahead_by, 0);
    assert_eq!(status.behind_by, 0);
}

#[tokio::test]
async fn merge_brings_shard_commits_into_base_branch() {
    let repo = init_repo();
    let manager = ShardManager::new();
    let shards_root = repo.path().join("shards");
    let shard = manager
        .allocate(
            repo.path(),
            &shards_root,
            &SpoolId::new("spool3"),
            "main",
            &OsRngIdGen,
        )
        .await
        .unwrap();

    std::fs::write(shard.worktree_path.join("new_file.txt"), "content\n").unwrap();
    run(&shard.worktree_path, &["add", "."]);
    run(
        &shard.worktree_path,
        &["commit", "-q", "-m", "add new_file"],
    );

    let result = manager.merge(repo.path(), &shard, "main").await.unwrap();
    assert!(result.conflicts.is_none());
    assert_eq!(result.merged_commits, 1);
    assert!(repo.path().join("new_file.txt").exists());
}

#[tokio::test]
async fn merge_reports_conflict_without_completing() {
    let repo = init_repo();
    let manager = ShardManager::new();
    let shards_root = repo.path().join("shards");
    let shard = manager
        .allocate(
            repo.path(),
            &shards_root,
            &SpoolId::new("spool4"),
            "main",
            &OsRngIdGen,
        )
        .await
        .unwrap();

    std::fs::write(shard.worktree_path.join("README.md"), "shard change\n").unwrap();
    run(&shard.worktree_path, &["add", "."]);
    run(&shard.worktree_path, &["commit", "-q", "-m", "shard edit"]);

    std::fs::write(repo.path().join("README.md"), "base change\n").unwrap();
    run(repo.path(), &["add", "."]);
    run(repo.path(), &["commit", "-q", "-m", "base edit"]);

    let result = manager.merge(repo.path(), &shard, "main").await.unwrap();
    assert!(result.conflicts.is_some());
}

#[tokio::test]
async fn abandon_removes_worktree_and_deletes_branch_by_default() {
    let repo = init_repo();
    let manager = ShardManager::new();
    let shards_root = repo.path().join("shards");
    let shard = manager
        .allocate(
            repo.path(),
            &shards_root,
            &SpoolId::new("spool5"),
            "main",
            &OsRngIdGen,
        )
        .await
        .unwrap();

    manager
        .abandon(repo.path(), &shard, false)
        .await
        .unwrap();

    assert!(!shard.worktree_path.exists());
    let branches = StdCommand::new("git")
        .args(["branch", "--list", &shard.branch_name])
        .current_dir(repo.path())
        .output()
        .unwrap();
    assert!(String::from_utf8_lossy(&branches.stdout).trim().is_empty());
}

#[tokio::test]
async fn abandon_keeps_branch_when_requested() {
    let repo = init_repo();
    let manager = ShardManager::new();
    let shards_root = repo.path().join("shards");
    let shard = manager
        .allocate(
            repo.path(),
            &shards_root,
            &SpoolId::new("spool6"),
            "main",
            &OsRngIdGen,
        )
        .await
        .unwrap();

    manager.abandon(repo.path(), &shard, true).await.unwrap();

    assert!(!shard.worktree_path.exists());
    let branches = StdCommand::new("git")
        .args(["branch", "--list", &shard.branch_name])
        .current_dir(repo.path())
        .output()
        .unwrap();
    assert!(!String::from_utf8_lossy(&branches.stdout).trim().is_empty());
}

#[test]
fn parses_left_right_counts() {
    assert_eq!(parse_left_right_count("3\t5\n"), (3, 5));
    assert_eq!(parse_left_right_count("0\t0"), (0, 0));
    assert_eq!(parse_left_right_count(""), (0, 0));
}
