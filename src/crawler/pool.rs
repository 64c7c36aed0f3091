//! Fetch pool supervisor
//!
//! Each worker is a spawned task with its own retirement token, a child of
//! the global shutdown token. The supervisor keeps the join handle of every
//! worker it ever started until that worker has been reaped.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::pipeline::{CrawlResult, Pipeline};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct Worker {
    id: usize,
    retire: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct FetchPool<F: PageFetcher> {
    fetcher: Arc<F>,
    pipeline: Arc<Pipeline>,
    shutdown: CancellationToken,
    workers: Vec<Worker>,
    retiring: Vec<Worker>,
    next_id: usize,
}

impl<F: PageFetcher> FetchPool<F> {
    pub fn new(fetcher: Arc<F>, pipeline: Arc<Pipeline>, shutdown: CancellationToken) -> Self {
        Self {
            fetcher,
            pipeline,
            shutdown,
            workers: Vec::new(),
            retiring: Vec::new(),
            next_id: 0,
        }
    }

    /// Number of live, non-retired workers
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Retired workers that have not been reaped yet
    pub fn draining(&self) -> usize {
        self.retiring.len()
    }

    /// Starts one worker
    pub fn spawn_worker(&mut self) {
        let id = self.next_id;
        self.next_id += 1;

        let retire = self.shutdown.child_token();
        let handle = tokio::spawn(run_worker(
            id,
            self.fetcher.clone(),
            self.pipeline.clone(),
            retire.clone(),
        ));

        self.workers.push(Worker { id, retire, handle });
    }

    /// Starts workers until the pool has `size` of them
    pub fn grow_to(&mut self, size: usize) {
        while self.workers.len() < size {
            self.spawn_worker();
        }
    }

    /// Signals the most recently started worker to stop
    ///
    /// Returns immediately; the worker finishes its in-flight fetch on its
    /// own and is joined by a later `reap`. Returns false if the pool is
    /// empty.
    pub fn retire_one(&mut self) -> bool {
        match self.workers.pop() {
            Some(worker) => {
                tracing::debug!("Retiring worker {}", worker.id);
                worker.retire.cancel();
                self.retiring.push(worker);
                true
            }
            None => false,
        }
    }

    /// Joins workers that have finished
    ///
    /// Retired workers end here normally. A live worker that has ended
    /// without being retired is dropped from `size` so the autoscaler can
    /// replace it.
    pub async fn reap(&mut self) {
        let (finished, pending): (Vec<_>, Vec<_>) = self
            .retiring
            .drain(..)
            .partition(|w| w.handle.is_finished());
        self.retiring = pending;

        let (dead, live): (Vec<_>, Vec<_>) = self
            .workers
            .drain(..)
            .partition(|w| w.handle.is_finished());
        self.workers = live;

        for worker in finished {
            join_worker(worker).await;
        }
        for worker in dead {
            tracing::warn!("Worker {} exited while live", worker.id);
            join_worker(worker).await;
        }
    }

    /// Starts or retires workers until the pool has `target` of them
    pub fn resize_to(&mut self, target: usize) {
        if target > self.workers.len() {
            self.grow_to(target);
        }
        while self.workers.len() > target && self.retire_one() {}
    }

    /// Stops every worker and waits for all of them, retired ones included
    ///
    /// Each worker completes the fetch it is running and pushes its result
    /// before exiting.
    pub async fn shutdown(mut self) {
        for worker in &self.workers {
            worker.retire.cancel();
        }

        let workers = self.workers.drain(..).chain(self.retiring.drain(..));
        let mut joined = 0;
        for worker in workers.collect::<Vec<_>>() {
            join_worker(worker).await;
            joined += 1;
        }

        tracing::debug!("Joined {} fetch workers", joined);
    }
}

async fn join_worker(worker: Worker) {
    if let Err(e) = worker.handle.await {
        tracing::error!("Worker {} terminated abnormally: {}", worker.id, e);
    }
}

/// Fetch loop: dequeue, fetch, hand the result to persistence
///
/// `stop` is checked only at dequeue, so a fetch that has started always
/// runs to completion and its result is always pushed. Each fetch runs in
/// its own task; if it panics the identifier still gets a failed result.
async fn run_worker<F: PageFetcher>(
    id: usize,
    fetcher: Arc<F>,
    pipeline: Arc<Pipeline>,
    stop: CancellationToken,
) {
    tracing::trace!("Worker {} started", id);

    while let Some(identifier) = pipeline.frontier.pop(&stop).await {
        let fetch = {
            let fetcher = fetcher.clone();
            let identifier = identifier.clone();
            tokio::spawn(async move { fetcher.fetch(&identifier).await })
        };

        let result = match fetch.await {
            Ok(Ok(page)) => {
                tracing::debug!("Fetched {} ({} links)", identifier, page.links.len());
                CrawlResult::fetched(identifier, page)
            }
            Ok(Err(e)) => {
                tracing::warn!("Fetch failed for {}: {}", identifier, e);
                CrawlResult::failed(identifier, e)
            }
            Err(e) => {
                tracing::error!("Fetch task for {} aborted: {}", identifier, e);
                CrawlResult::failed(identifier, e)
            }
        };
        pipeline.results.push(result);
    }

    tracing::trace!("Worker {} stopped", id);
}
