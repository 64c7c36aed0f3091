//! Graceful shutdown tests
//!
//! Fetches are held at a gate so the test controls exactly what is in
//! flight when the shutdown token fires.

mod common;

use common::{create_test_config, GatedFetcher};
use linkgraph::crawler::Coordinator;
use linkgraph::state::FetchState;
use linkgraph::storage::{LinkStore, RunStatus, SqliteLinkStore};
use std::time::Duration;

/// Store with `count` pending internal pages `./P0`, `./P1`, ...
fn store_with_pending(count: usize) -> SqliteLinkStore {
    let mut store = SqliteLinkStore::open_in_memory().unwrap();
    for i in 0..count {
        let id = format!("./P{}", i);
        store.ensure_page_exists(&id, &id, true).unwrap();
    }
    store
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_in_flight_fetches_complete_on_shutdown() {
    let fetcher = GatedFetcher::new();

    let mut config = create_test_config("./P0", ":memory:");
    config.pool.initial_size = 5;
    // Keep the autoscaler out of the way
    config.autoscale.tick_interval_ms = 60_000;

    let coordinator = Coordinator::new(config, store_with_pending(12), fetcher.clone()).unwrap();
    let shutdown = coordinator.shutdown();
    let crawl = tokio::spawn(coordinator.run());

    // Five workers, five fetches parked at the gate
    fetcher.wait_for_started(5).await;
    shutdown.trigger();

    // Give workers a chance to misbehave before releasing them
    tokio::time::sleep(Duration::from_millis(50)).await;
    fetcher.release(100);

    let report = tokio::time::timeout(Duration::from_secs(10), crawl)
        .await
        .expect("crawl did not drain")
        .unwrap()
        .unwrap();

    // Every in-flight fetch finished and nothing new was dequeued
    assert_eq!(fetcher.started(), 5);
    assert_eq!(fetcher.finished(), 5);

    // All five results reached the store and were committed
    assert_eq!(report.status, RunStatus::Interrupted);
    assert_eq!(report.stats.pages_fetched, 5);
    assert_eq!(report.store.stats().unwrap().fetched_count, 5);
    assert!(!report.store.in_batch());

    // The rest stay pending for the next run
    assert_eq!(report.frontier_remaining, 7);
    assert_eq!(report.store.list_pending().unwrap().len(), 7);
    assert_eq!(
        report
            .store
            .latest_run()
            .unwrap()
            .unwrap()
            .status,
        RunStatus::Interrupted
    );
}

#[tokio::test]
async fn test_shutdown_with_idle_workers() {
    let fetcher = GatedFetcher::new();

    let mut config = create_test_config("./P0", ":memory:");
    config.pool.initial_size = 3;

    let coordinator = Coordinator::new(config, store_with_pending(1), fetcher.clone()).unwrap();
    let shutdown = coordinator.shutdown();
    let crawl = tokio::spawn(coordinator.run());

    // One worker holds the only page; the other two wait on the frontier
    fetcher.wait_for_started(1).await;
    shutdown.trigger();
    fetcher.release(1);

    let report = tokio::time::timeout(Duration::from_secs(10), crawl)
        .await
        .expect("crawl did not drain")
        .unwrap()
        .unwrap();

    assert_eq!(fetcher.started(), 1);
    assert_eq!(report.status, RunStatus::Interrupted);
    assert_eq!(
        report.store.get_page("./P0").unwrap().unwrap().fetch_state,
        FetchState::Fetched
    );
    assert_eq!(report.frontier_remaining, 0);
}
