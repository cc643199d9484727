use super::*;
use crate::test_support::running_spool;
use spindle_store::JsonSpoolStore;
use std::time::Duration;
use tempfile::tempdir;

fn store() -> Arc<JsonSpoolStore> {
    let dir = tempdir().unwrap();
    Arc::new(JsonSpoolStore::open(dir.into_path()).unwrap())
}

async fn complete_after(store: Arc<JsonSpoolStore>, id: SpoolId, millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    store
        .update(&id, &mut |s| s.mark_complete("done".into(), None, Local::now()))
        .unwrap();
}

use chrono::Local;

#[tokio::test]
async fn gather_waits_for_every_id_to_go_terminal() {
    let store = store();
    let ids: Vec<SpoolId> = ["a", "b", "c"]
        .iter()
        .map(|id| {
            let spool = running_spool(id);
            store.put(&spool).unwrap();
            spool.id
        })
        .collect();

    let store_dyn: Arc<dyn SpoolStore> = store.clone();
    tokio::spawn(complete_after(store.clone(), ids[0].clone(), 10));
    tokio::spawn(complete_after(store.clone(), ids[1].clone(), 20));
    tokio::spawn(complete_after(store.clone(), ids[2].clone(), 30));

    let coordinator = WaitCoordinator::new(store_dyn);
    let results = coordinator.gather(&ids, Duration::from_secs(5)).await;

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|s| s.status.is_terminal()));
    assert_eq!(results.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn gather_reports_non_terminal_state_at_deadline() {
    let store = store();
    let spool = running_spool("stuck");
    store.put(&spool).unwrap();

    let coordinator = WaitCoordinator::new(store.clone() as Arc<dyn SpoolStore>);
    let results = coordinator
        .gather(&[spool.id.clone()], Duration::from_millis(150))
        .await;

    assert_eq!(results.len(), 1);
    assert!(!results[0].status.is_terminal());
}

#[tokio::test]
async fn stream_yields_in_completion_order() {
    let store = store();
    let ids: Vec<SpoolId> = ["x", "y", "z"]
        .iter()
        .map(|id| {
            let spool = running_spool(id);
            store.put(&spool).unwrap();
            spool.id
        })
        .collect();

    tokio::spawn(complete_after(store.clone(), ids[2].clone(), 10));
    tokio::spawn(complete_after(store.clone(), ids[0].clone(), 40));
    tokio::spawn(complete_after(store.clone(), ids[1].clone(), 70));

    let coordinator = WaitCoordinator::new(store.clone() as Arc<dyn SpoolStore>);
    let (tx, mut rx) = tokio::sync::mpsc::channel(8);
    coordinator.stream(&ids, Duration::from_secs(5), tx).await;

    let mut order = Vec::new();
    while let Some(spool) = rx.recv().await {
        order.push(spool.id.as_str().to_string());
    }
    assert_eq!(order, vec!["z", "x", "y"]);
}

#[tokio::test]
async fn stream_tie_breaks_same_tick_completions_by_ascending_id() {
    let store = store();
    let ids: Vec<SpoolId> = ["m", "a", "z"]
        .iter()
        .map(|id| {
            let spool = running_spool(id);
            store.put(&spool).unwrap();
            spool.id
        })
        .collect();

    // All three finalize before the coordinator's first poll tick.
    for id in &ids {
        store
            .update(id, &mut |s| s.mark_complete("done".into(), None, Local::now()))
            .unwrap();
    }

    let coordinator = WaitCoordinator::new(store.clone() as Arc<dyn SpoolStore>);
    let (tx, mut rx) = tokio::sync::mpsc::channel(8);
    coordinator.stream(&ids, Duration::from_secs(5), tx).await;

    let mut order = Vec::new();
    while let Some(spool) = rx.recv().await {
        order.push(spool.id.as_str().to_string());
    }
    assert_eq!(order, vec!["a", "m", "z"]);
}
