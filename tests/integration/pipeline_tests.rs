//! End-to-end crawl tests against an in-memory link graph
//!
//! These tests run the whole pipeline (pool, persistence, autoscaler and
//! coordinator) with a scripted fetcher and a real SQLite store.

mod common;

use common::{create_test_config, ScriptedFetcher};
use linkgraph::crawler::Coordinator;
use linkgraph::state::FetchState;
use linkgraph::storage::{open_store, LinkStore, RunStatus, SqliteLinkStore};
use std::sync::Arc;

fn memory_store() -> SqliteLinkStore {
    SqliteLinkStore::open_in_memory().expect("Failed to open in-memory store")
}

#[tokio::test]
async fn test_duplicate_links_and_external_leaves() {
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page("./S", &[("./A", "A"), ("./A", "A"), ("https://x", "X")])
            .page("./A", &[]),
    );
    let config = create_test_config("./S", ":memory:");

    let report = Coordinator::new(config, memory_store(), fetcher.clone())
        .unwrap()
        .run()
        .await
        .unwrap();
    let store = report.store;

    assert_eq!(report.status, RunStatus::Completed);

    // One page row for A, fetched exactly once
    let a = store.get_page("./A").unwrap().expect("A should exist");
    assert_eq!(a.fetch_state, FetchState::Fetched);
    assert!(a.is_internal);
    assert_eq!(fetcher.call_count("./A"), 1);

    // One S -> A edge despite the repeated link
    let from_s = store.outgoing_links("./S").unwrap();
    assert_eq!(from_s.iter().filter(|to| *to == "./A").count(), 1);

    // The external link is a leaf: recorded, never fetched
    let x = store.get_page("https://x").unwrap().expect("x should exist");
    assert!(!x.is_internal);
    assert_eq!(x.fetch_state, FetchState::Pending);
    assert_eq!(fetcher.call_count("https://x"), 0);

    assert_eq!(report.stats.pages_fetched, 2);
    assert_eq!(report.stats.links_recorded, 2);
}

#[tokio::test]
async fn test_excluded_links_never_recorded() {
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(
                "./S",
                &[
                    ("./S#cite_note-1", "[1]"),
                    ("./Special:BookSources/978-0-19", "ISBN"),
                    ("#History", "History"),
                    ("./B", "B"),
                ],
            )
            .page("./B", &[]),
    );
    let config = create_test_config("./S", ":memory:");

    let report = Coordinator::new(config, memory_store(), fetcher.clone())
        .unwrap()
        .run()
        .await
        .unwrap();
    let store = report.store;

    assert_eq!(store.outgoing_links("./S").unwrap(), vec!["./B".to_string()]);
    assert!(store.get_page("./S#cite_note-1").unwrap().is_none());
    assert!(store
        .get_page("./Special:BookSources/978-0-19")
        .unwrap()
        .is_none());

    let mut calls = fetcher.calls();
    calls.sort();
    assert_eq!(calls, vec!["./B".to_string(), "./S".to_string()]);
}

#[tokio::test]
async fn test_every_page_fetched_once() {
    // Diamond with a back edge and a self loop
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page("./Root", &[("./Left", "Left"), ("./Right", "Right")])
            .page("./Left", &[("./Bottom", "Bottom"), ("./Root", "Root")])
            .page("./Right", &[("./Bottom", "Bottom"), ("./Right", "Right")])
            .page("./Bottom", &[("./Left", "Left")]),
    );
    let config = create_test_config("./Root", ":memory:");

    let report = Coordinator::new(config, memory_store(), fetcher.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    for page in ["./Root", "./Left", "./Right", "./Bottom"] {
        assert_eq!(fetcher.call_count(page), 1, "{} fetched more than once", page);
    }

    let stored = report.store.stats().unwrap();
    assert_eq!(stored.fetched_count, 4);
    assert_eq!(stored.link_count, 7);
    assert_eq!(report.stats.pages_fetched, stored.fetched_count);
    assert_eq!(report.stats.links_recorded, stored.link_count);
    assert!(report.store.list_pending().unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_failures_are_absorbed() {
    let fetcher = Arc::new(
        ScriptedFetcher::new().page("./S", &[("./Gone", "Gone"), ("./Here", "Here")]).page("./Here", &[]),
    );
    let config = create_test_config("./S", ":memory:");

    let report = Coordinator::new(config, memory_store(), fetcher)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.stats.fetch_failures, 1);

    let gone = report.store.get_page("./Gone").unwrap().unwrap();
    assert_eq!(gone.fetch_state, FetchState::Fetched);
    assert_eq!(gone.raw_content, None);
    assert!(report.store.outgoing_links("./Gone").unwrap().is_empty());
}

#[tokio::test]
async fn test_crawl_persists_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("graph.sqlite");
    let db = db_path.to_str().unwrap();

    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page("./S", &[("./A", "A")])
            .page("./A", &[]),
    );
    let config = create_test_config("./S", db);

    let report = Coordinator::new(config, open_store(&db_path).unwrap(), fetcher)
        .unwrap()
        .run()
        .await
        .unwrap();
    drop(report);

    let reopened = open_store(&db_path).unwrap();
    let stats = reopened.stats().unwrap();
    assert_eq!(stats.fetched_count, 2);
    assert_eq!(stats.link_count, 1);

    let run = reopened.latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert!(run.finished_at.is_some());
}
