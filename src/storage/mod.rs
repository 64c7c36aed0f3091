//! Storage module for persisting the crawl graph
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Deduplicating page and link inserts
//! - Batched commits for the persistence stage
//! - Resume queries (pending pages, derived counts)
//! - Run tracking

#[cfg(test)]
pub(crate) mod faulty;
mod schema;
mod sqlite;
mod traits;

pub use schema::SCHEMA_VERSION;
pub use sqlite::SqliteLinkStore;
pub use traits::{LinkStore, StorageError, StorageResult};

use crate::state::FetchState;

use std::path::Path;

/// Opens (creating if necessary) the link store at `path`
///
/// Failure here is fatal to a crawl: nothing runs without a working store.
pub fn open_store(path: &Path) -> StorageResult<SqliteLinkStore> {
    SqliteLinkStore::new(path)
}

/// Represents a page in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub identifier: String,
    pub display_name: String,
    pub is_internal: bool,
    pub fetch_state: FetchState,
    pub raw_content: Option<String>,
    pub discovered_at: String,
    pub fetched_at: Option<String>,
}

/// Counts derived from the store, used to reconcile in-memory counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub fetched_count: u64,
    pub link_count: u64,
}

/// Page totals broken down by state and origin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageCounts {
    pub total: u64,
    pub fetched: u64,
    pub pending: u64,
    pub internal: u64,
    pub external: u64,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
