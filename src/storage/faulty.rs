//! Link store wrapper that fails on demand, for exercising error paths

use crate::storage::{
    LinkStore, PageCounts, PageRecord, RunRecord, RunStatus, SqliteLinkStore, StorageError,
    StorageResult, StoreStats,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// `mark_fetched` panics
    PanicOnMarkFetched,
    /// `insert_link_if_new` returns an error
    FailLinkInsert,
}

/// In-memory SQLite store with one injected fault
pub struct FaultyStore {
    inner: SqliteLinkStore,
    fault: Fault,
}

impl FaultyStore {
    pub fn new(fault: Fault) -> Self {
        Self {
            inner: SqliteLinkStore::open_in_memory().unwrap(),
            fault,
        }
    }

    pub fn inner(&self) -> &SqliteLinkStore {
        &self.inner
    }
}

impl LinkStore for FaultyStore {
    fn ensure_page_exists(
        &mut self,
        identifier: &str,
        display_name: &str,
        is_internal: bool,
    ) -> StorageResult<bool> {
        self.inner
            .ensure_page_exists(identifier, display_name, is_internal)
    }

    fn insert_link_if_new(&mut self, from: &str, to: &str) -> StorageResult<bool> {
        if self.fault == Fault::FailLinkInsert {
            return Err(StorageError::PageNotFound(to.to_string()));
        }
        self.inner.insert_link_if_new(from, to)
    }

    fn mark_fetched(&mut self, identifier: &str, content: Option<&str>) -> StorageResult<()> {
        if self.fault == Fault::PanicOnMarkFetched {
            panic!("store fault while marking {}", identifier);
        }
        self.inner.mark_fetched(identifier, content)
    }

    fn list_pending(&self) -> StorageResult<Vec<String>> {
        self.inner.list_pending()
    }

    fn stats(&self) -> StorageResult<StoreStats> {
        self.inner.stats()
    }

    fn get_page(&self, identifier: &str) -> StorageResult<Option<PageRecord>> {
        self.inner.get_page(identifier)
    }

    fn outgoing_links(&self, from: &str) -> StorageResult<Vec<String>> {
        self.inner.outgoing_links(from)
    }

    fn page_counts(&self) -> StorageResult<PageCounts> {
        self.inner.page_counts()
    }

    fn begin_batch(&mut self) -> StorageResult<()> {
        self.inner.begin_batch()
    }

    fn commit_batch(&mut self) -> StorageResult<()> {
        self.inner.commit_batch()
    }

    fn rollback_batch(&mut self) -> StorageResult<()> {
        self.inner.rollback_batch()
    }

    fn begin_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        self.inner.begin_run(config_hash)
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        self.inner.finish_run(run_id, status)
    }

    fn latest_run(&self) -> StorageResult<Option<RunRecord>> {
        self.inner.latest_run()
    }
}
