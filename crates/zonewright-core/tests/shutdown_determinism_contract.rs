//! Contract Test: Shutdown Determinism
//!
//! Constraints verified:
//! - The reconciler runs a pass as soon as it starts
//! - It terminates on the shutdown signal
//! - It reports a Stopped event
//! - The file store holds everything written before exit
//!
//! If this test fails, someone has added detached tasks, tasks that ignore
//! cancellation, or blocking work in the shutdown path.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use zonewright_core::traits::ResourceStore;
use zonewright_core::{FileResourceStore, ReconcileEvent, Reconciler};

#[tokio::test]
async fn shutdown_signal_terminates_reconciler() {
    let h = Harness::new();
    let (reconciler, mut events) = h.reconciler();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = tokio::spawn(async move { reconciler.run_with_shutdown(Some(shutdown_rx)).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown_tx.send(()).expect("shutdown signal send succeeds");

    let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
    assert!(result.is_ok(), "Reconciler should terminate within 5 seconds");
    let run_result = result.unwrap().unwrap();
    assert!(run_result.is_ok(), "Reconciler should shut down cleanly: {:?}", run_result);

    let events = drain(&mut events);
    assert!(matches!(events.first(), Some(ReconcileEvent::PassStarted { .. })));
    assert!(matches!(events.last(), Some(ReconcileEvent::Stopped { .. })));
}

#[tokio::test]
async fn dropped_shutdown_sender_also_stops() {
    let h = Harness::new();
    let (reconciler, _events) = h.reconciler();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(async move { reconciler.run_with_shutdown(Some(shutdown_rx)).await });
    drop(shutdown_tx);

    let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
    assert!(result.is_ok(), "Reconciler should treat a dropped sender as shutdown");
}

#[tokio::test]
async fn first_pass_runs_before_shutdown() {
    let h = Harness::new();
    let zone_id = h.provider.add_zone("example.com", None);
    h.store
        .save_record_set(&a_record("www.example.com", &zone_id, &["192.0.2.1"]))
        .await
        .unwrap();

    let (reconciler, _events) = h.reconciler();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = tokio::spawn(async move { reconciler.run_with_shutdown(Some(shutdown_rx)).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();

    assert_eq!(h.provider.record_sets(&zone_id).len(), 1);
}

#[tokio::test]
async fn file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resources.json");
    let h = Harness::new();

    // First run: create the zone and persist its id and token
    {
        let store = FileResourceStore::new(&path).await.unwrap();
        store.save_zone(&public_zone("example", "example.com")).await.unwrap();

        let (reconciler, _events) =
            Reconciler::new(Arc::new(h.provider.clone()), Arc::new(store), fast_config()).unwrap();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let handle = tokio::spawn(async move { reconciler.run_with_shutdown(Some(shutdown_rx)).await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown_tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }

    assert_eq!(h.log.count("provider:CreateHostedZone"), 1);

    // Second run from the same file: the zone is observed, not recreated
    let store = FileResourceStore::new(&path).await.unwrap();
    let zone = store.get_zone("example").await.unwrap().expect("zone persisted");
    assert!(zone.external_name.is_some());
    assert!(zone.spec.caller_reference.is_some());

    let (reconciler, _events) = Reconciler::new(Arc::new(h.provider.clone()), Arc::new(store), fast_config()).unwrap();
    reconciler.reconcile_once().await.unwrap();

    assert_eq!(h.log.count("provider:CreateHostedZone"), 1);
    assert_eq!(h.log.count("provider:GetHostedZone"), 1);
}
