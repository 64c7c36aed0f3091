//! Statistics generation from the link store
//!
//! This module provides functionality for extracting and displaying
//! graph statistics from the storage layer.

use crate::storage::{LinkStore, PageCounts, RunRecord, StorageResult};
use std::fmt::Write;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Page totals by fetch state and origin
    pub pages: PageCounts,

    /// Total number of distinct directed links
    pub total_links: u64,

    /// Most recent run, if any
    pub latest_run: Option<RunRecord>,
}

impl CrawlStatistics {
    /// Share of internal pages already fetched, in percent
    pub fn progress(&self) -> f64 {
        if self.pages.internal == 0 {
            0.0
        } else {
            (self.pages.fetched as f64 / self.pages.internal as f64) * 100.0
        }
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The link store to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(store: &dyn LinkStore) -> StorageResult<CrawlStatistics> {
    let pages = store.page_counts()?;
    let total_links = store.stats()?.link_count;
    let latest_run = store.latest_run()?;

    Ok(CrawlStatistics {
        pages,
        total_links,
        latest_run,
    })
}

fn run_duration_seconds(run: &RunRecord) -> Option<i64> {
    let started = run.started_at.parse::<chrono::DateTime<chrono::Utc>>().ok()?;
    let finished = run
        .finished_at
        .as_ref()?
        .parse::<chrono::DateTime<chrono::Utc>>()
        .ok()?;
    Some((finished - started).num_seconds())
}

/// Renders statistics as the text `print_statistics` writes
pub fn format_statistics(stats: &CrawlStatistics) -> String {
    let mut out = String::new();
    let pages = &stats.pages;

    // Writing to a String cannot fail
    let _ = writeln!(out, "=== Link Graph Statistics ===\n");

    let _ = writeln!(out, "Pages:");
    let _ = writeln!(out, "  Total: {}", pages.total);
    let _ = writeln!(out, "  Fetched: {}", pages.fetched);
    let _ = writeln!(out, "  Pending: {}", pages.pending);
    let _ = writeln!(out, "  Internal: {}", pages.internal);
    let _ = writeln!(out, "  External: {}", pages.external);
    let _ = writeln!(out);

    let _ = writeln!(out, "Links: {}", stats.total_links);
    let _ = writeln!(
        out,
        "Progress: {:.1}% ({} / {} internal pages fetched)",
        stats.progress(),
        pages.fetched,
        pages.internal
    );

    if let Some(run) = &stats.latest_run {
        let _ = writeln!(out);
        let _ = writeln!(out, "Latest run: #{} ({})", run.id, run.status.to_db_string());
        let _ = writeln!(out, "  Started: {}", run.started_at);
        if let Some(finished) = &run.finished_at {
            let _ = writeln!(out, "  Finished: {}", finished);
        }
        if let Some(seconds) = run_duration_seconds(run) {
            let _ = writeln!(out, "  Duration: {}s", seconds);
        }
    }

    out
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    print!("{}", format_statistics(stats));
}
