//! Persistence stage: the single writer to the link store
//!
//! Results are written inside a store batch that is committed at most
//! `commit_interval` after it was opened, and always before the stage exits.
//! A store error ends the stage: the open batch is rolled back and the
//! global shutdown token is cancelled so the rest of the crawl drains.

use crate::crawler::filter::{LinkClass, LinkFilter};
use crate::crawler::pipeline::{CrawlResult, Pipeline};
use crate::storage::{LinkStore, StorageResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub struct PersistenceStage<S: LinkStore> {
    store: S,
    pipeline: Arc<Pipeline>,
    filter: LinkFilter,
    commit_interval: Duration,
    stop: CancellationToken,
    shutdown: CancellationToken,
}

impl<S: LinkStore> PersistenceStage<S> {
    /// Creates the stage
    ///
    /// # Arguments
    ///
    /// * `store` - The link store; owned by the stage until it exits
    /// * `pipeline` - Source of results and destination of new identifiers
    /// * `filter` - Inclusion filter applied before any store mutation
    /// * `commit_interval` - Upper bound on how long a batch stays open
    /// * `stop` - Cancelled once every fetch worker has been joined
    /// * `shutdown` - Global token, cancelled by the stage on store failure
    pub fn new(
        store: S,
        pipeline: Arc<Pipeline>,
        filter: LinkFilter,
        commit_interval: Duration,
        stop: CancellationToken,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            pipeline,
            filter,
            commit_interval,
            stop,
            shutdown,
        }
    }

    /// Runs until `stop` is cancelled, then drains the result queue
    ///
    /// Hands the store back together with the outcome so the caller can
    /// record how the run ended.
    pub async fn run(mut self) -> (S, StorageResult<()>) {
        let outcome = self.process().await;

        if let Err(e) = &outcome {
            tracing::error!("Persistence failed: {}", e);
            if let Err(rollback) = self.store.rollback_batch() {
                tracing::error!("Rollback failed: {}", rollback);
            }
            self.shutdown.cancel();
        }

        (self.store, outcome)
    }

    async fn process(&mut self) -> StorageResult<()> {
        let mut flush_at = Instant::now() + self.commit_interval;

        loop {
            tokio::select! {
                result = self.pipeline.results.pop(&self.stop) => match result {
                    Some(result) => self.persist_result(result)?,
                    None => break,
                },
                _ = tokio::time::sleep_until(flush_at) => {
                    self.store.commit_batch()?;
                    flush_at = Instant::now() + self.commit_interval;
                }
            }
        }

        let mut drained = 0;
        while let Some(result) = self.pipeline.results.try_pop() {
            self.persist_result(result)?;
            drained += 1;
        }
        if drained > 0 {
            tracing::debug!("Drained {} results after stop", drained);
        }

        self.store.commit_batch()
    }

    /// Applies one fetch result to the store
    ///
    /// Marks the source page fetched, then records each accepted link.
    /// A link target that did not exist before and is internal goes onto
    /// the frontier. Counters and the frontier are only touched once every
    /// write for the result has succeeded.
    pub fn persist_result(&mut self, result: CrawlResult) -> StorageResult<()> {
        self.store.begin_batch()?;

        self.store
            .mark_fetched(&result.from, result.content.as_deref())?;

        let mut recorded = 0;
        let mut discovered = Vec::new();
        for link in &result.links {
            let Some(class) = self.filter.classify(&link.href) else {
                tracing::trace!("Skipping {} on {}", link.href, result.from);
                continue;
            };
            let internal = class == LinkClass::Internal;

            let created = self
                .store
                .ensure_page_exists(&link.href, &link.title, internal)?;
            let inserted = self.store.insert_link_if_new(&result.from, &link.href)?;

            if inserted {
                recorded += 1;
            }
            if inserted && created && internal {
                discovered.push(link.href.clone());
            }
        }

        self.pipeline.stats.record_page_fetched();
        if result.is_failure() {
            self.pipeline.stats.record_fetch_failure();
        }
        self.pipeline.stats.record_links(recorded);
        for identifier in discovered {
            self.pipeline.schedule(identifier);
        }

        self.pipeline.complete();
        Ok(())
    }
}
