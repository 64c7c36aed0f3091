//! Storage traits and error types
//!
//! This module defines the trait interface for link store backends and
//! associated error types.

use crate::storage::{PageCounts, PageRecord, RunRecord, RunStatus, StoreStats};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable record of pages and directed links
///
/// The persistence stage is the only writer once a crawl is running. Every
/// insert is a dedup-insert: its boolean result says whether the row is new,
/// and a duplicate is never an error.
pub trait LinkStore: Send {
    // ===== Graph =====

    /// Inserts a `Pending` page if no page with this identifier exists
    ///
    /// Returns true when the row was created. A redundant call is a no-op
    /// and keeps the display name from the first call.
    fn ensure_page_exists(
        &mut self,
        identifier: &str,
        display_name: &str,
        is_internal: bool,
    ) -> StorageResult<bool>;

    /// Records the directed edge `from -> to`
    ///
    /// Returns false when the identical edge is already stored. Both pages
    /// must already exist.
    fn insert_link_if_new(&mut self, from: &str, to: &str) -> StorageResult<bool>;

    /// Marks a page `Fetched` and stores its raw content. Idempotent.
    fn mark_fetched(&mut self, identifier: &str, content: Option<&str>) -> StorageResult<()>;

    /// Identifiers of every internal page still `Pending`
    fn list_pending(&self) -> StorageResult<Vec<String>>;

    /// Fetched-page and link counts derived from stored rows
    fn stats(&self) -> StorageResult<StoreStats>;

    /// Gets a page by identifier
    fn get_page(&self, identifier: &str) -> StorageResult<Option<PageRecord>>;

    /// Targets of every stored edge leaving `from`
    fn outgoing_links(&self, from: &str) -> StorageResult<Vec<String>>;

    /// Page totals for reporting
    fn page_counts(&self) -> StorageResult<PageCounts>;

    // ===== Batching =====

    /// Opens a write batch if none is open
    ///
    /// Writes made inside a batch become durable together at
    /// `commit_batch`, or not at all.
    fn begin_batch(&mut self) -> StorageResult<()>;

    /// Commits the open batch, if any
    fn commit_batch(&mut self) -> StorageResult<()>;

    /// Discards the open batch, if any
    fn rollback_batch(&mut self) -> StorageResult<()>;

    // ===== Run Management =====

    /// Records the start of a crawl run and returns its ID
    fn begin_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Records how a run ended
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    /// Gets the most recent run
    fn latest_run(&self) -> StorageResult<Option<RunRecord>>;
}
