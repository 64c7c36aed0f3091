//! Shared fixtures for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use linkgraph::config::Config;
use linkgraph::crawler::{DiscoveredLink, FetchError, FetchedPage, PageFetcher};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// Creates a test configuration with fast ticks and commits
pub fn create_test_config(seed: &str, db_path: &str) -> Config {
    let mut config = Config::default();
    config.crawl.seed = seed.to_string();
    config.crawl.seed_title = seed.trim_start_matches("./").to_string();
    config.pool.initial_size = 4;
    config.autoscale.tick_interval_ms = 50;
    config.storage.database_path = db_path.to_string();
    config.storage.commit_interval_ms = 20;
    config
}

/// Serves a fixed link graph from memory and records every call
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    pages: HashMap<String, Vec<DiscoveredLink>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page whose links are given as `(href, title)` pairs
    pub fn page(mut self, identifier: &str, links: &[(&str, &str)]) -> Self {
        self.pages.insert(
            identifier.to_string(),
            links
                .iter()
                .map(|(href, title)| DiscoveredLink::new(*href, *title))
                .collect(),
        );
        self
    }

    /// Identifiers fetched so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, identifier: &str) -> usize {
        self.calls().iter().filter(|c| *c == identifier).count()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, identifier: &str) -> Result<FetchedPage, FetchError> {
        self.calls.lock().unwrap().push(identifier.to_string());

        match self.pages.get(identifier) {
            Some(links) => Ok(FetchedPage {
                content: format!("<html><body>{}</body></html>", identifier),
                links: links.clone(),
            }),
            None => Err(FetchError::Status {
                url: identifier.to_string(),
                status: 404,
            }),
        }
    }
}

/// Blocks every fetch until the test releases it
#[derive(Debug)]
pub struct GatedFetcher {
    gate: Semaphore,
    started: AtomicUsize,
    finished: AtomicUsize,
}

impl GatedFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        })
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    /// Lets up to `n` blocked or future fetches through
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Polls until `n` fetches are blocked at the gate
    pub async fn wait_for_started(&self, n: usize) {
        for _ in 0..500 {
            if self.started() >= n {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("expected {} fetches to start, saw {}", n, self.started());
    }
}

#[async_trait]
impl PageFetcher for GatedFetcher {
    async fn fetch(&self, identifier: &str) -> Result<FetchedPage, FetchError> {
        self.started.fetch_add(1, Ordering::SeqCst);

        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| FetchError::EmptyContent(identifier.to_string()))?;
        permit.forget();

        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(FetchedPage {
            content: format!("<p>{}</p>", identifier),
            links: vec![],
        })
    }
}
