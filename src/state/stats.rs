//! Process-wide crawl counters
//!
//! Only the persistence stage writes these; the control task reads them for
//! status output. `pages_fetched` and `links_recorded` mirror what
//! `LinkStore::stats` would report and are reconciled from it on resume.

use crate::storage::StoreStats;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct CrawlStats {
    pages_fetched: AtomicU64,
    links_recorded: AtomicU64,
    fetch_failures: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub pages_fetched: u64,
    pub links_recorded: u64,
    /// Not persisted; counts failures seen by this process only
    pub fetch_failures: u64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the durable counters with values re-derived from the store
    pub fn reconcile(&self, stored: StoreStats) {
        self.pages_fetched
            .store(stored.fetched_count, Ordering::Relaxed);
        self.links_recorded
            .store(stored.link_count, Ordering::Relaxed);
    }

    pub fn record_page_fetched(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_links(&self, count: u64) {
        self.links_recorded.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched.load(Ordering::Relaxed)
    }

    pub fn links_recorded(&self) -> u64 {
        self.links_recorded.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_fetched: self.pages_fetched(),
            links_recorded: self.links_recorded(),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
        }
    }
}
