//! Shared state flowing between the fetch pool and the persistence stage

use crate::crawler::fetcher::{DiscoveredLink, FetchedPage};
use crate::crawler::queue::WorkQueue;
use crate::state::CrawlStats;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Outcome of one fetch, handed from a worker to the persistence stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlResult {
    /// Identifier of the page that was fetched
    pub from: String,
    pub content: Option<String>,
    pub links: Vec<DiscoveredLink>,
    /// Set when the fetch failed; `links` is then empty
    pub error: Option<String>,
}

impl CrawlResult {
    pub fn fetched(from: impl Into<String>, page: FetchedPage) -> Self {
        Self {
            from: from.into(),
            content: Some(page.content),
            links: page.links,
            error: None,
        }
    }

    pub fn failed(from: impl Into<String>, error: impl ToString) -> Self {
        Self {
            from: from.into(),
            content: None,
            links: Vec::new(),
            error: Some(error.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Frontier, result queue and counters for one crawl
///
/// `outstanding` counts identifiers that have been scheduled but whose
/// result has not yet been persisted. When it reaches zero with the
/// frontier empty, the crawl has run out of work.
#[derive(Debug, Default)]
pub struct Pipeline {
    pub frontier: WorkQueue<String>,
    pub results: WorkQueue<CrawlResult>,
    pub stats: CrawlStats,
    outstanding: AtomicUsize,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an identifier to the frontier
    pub fn schedule(&self, identifier: impl Into<String>) {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        self.frontier.push(identifier.into());
    }

    /// Marks one scheduled identifier as fully persisted
    pub fn complete(&self) {
        // Saturate so a stray call cannot wrap the counter
        let _ = self
            .outstanding
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// True once nothing is queued, in flight, or awaiting persistence
    pub fn is_idle(&self) -> bool {
        self.outstanding() == 0
    }
}
