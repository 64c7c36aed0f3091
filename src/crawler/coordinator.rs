//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator owns one crawl run from start to finish:
//! - Recording the run and recovering the frontier from the store
//! - Starting the persistence stage and the initial fetch workers
//! - Ticking the autoscaler and logging status
//! - Detecting natural completion or an external shutdown
//! - Draining every stage in order and recording how the run ended

use crate::config::{effective_config_hash, validate, Config};
use crate::crawler::autoscaler::{Autoscaler, ScaleDecision};
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::filter::LinkFilter;
use crate::crawler::persistence::PersistenceStage;
use crate::crawler::pipeline::Pipeline;
use crate::crawler::pool::FetchPool;
use crate::crawler::resume::{resume, ResumePoint};
use crate::crawler::shutdown::ShutdownCoordinator;
use crate::state::StatsSnapshot;
use crate::storage::{open_store, LinkStore, RunStatus, SqliteLinkStore};
use crate::CrawlError;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// How often the control loop checks whether all work is done
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Summary of a finished run
#[derive(Debug)]
pub struct CrawlReport<S> {
    pub run_id: i64,
    pub status: RunStatus,
    pub stats: StatsSnapshot,
    /// Identifiers left on the frontier; they remain `Pending` in the store
    pub frontier_remaining: usize,
    pub store: S,
}

/// Main crawler coordinator structure
pub struct Coordinator<S: LinkStore + 'static, F: PageFetcher> {
    config: Config,
    store: S,
    fetcher: Arc<F>,
    config_hash: String,
    shutdown: ShutdownCoordinator,
}

impl Coordinator<SqliteLinkStore, HttpFetcher> {
    /// Opens the configured SQLite store and builds the HTTP fetcher
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlError)` - Invalid configuration or store unavailable
    pub fn open(config: Config) -> Result<Self, CrawlError> {
        validate(&config)?;

        let store = open_store(Path::new(&config.storage.database_path))?;
        let fetcher = HttpFetcher::new(&config.fetcher, &config.filter.internal_prefix)?;

        Self::new(config, store, fetcher)
    }
}

impl<S: LinkStore + 'static, F: PageFetcher> Coordinator<S, F> {
    /// Creates a coordinator over an already opened store
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `store` - The link store; handed to the persistence stage for the run
    /// * `fetcher` - Page fetcher shared by all workers
    pub fn new(config: Config, store: S, fetcher: F) -> Result<Self, CrawlError> {
        validate(&config)?;
        let config_hash = effective_config_hash(&config)?;

        Ok(Self {
            config,
            store,
            fetcher: Arc::new(fetcher),
            config_hash,
            shutdown: ShutdownCoordinator::new(),
        })
    }

    /// Records `hash` on the run instead of the hash of the parsed config
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = hash.into();
        self
    }

    /// Handle for stopping the crawl from outside
    pub fn shutdown(&self) -> ShutdownCoordinator {
        self.shutdown.clone()
    }

    /// Runs the crawl until it runs out of work or is shut down
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The run ended as `Completed` or `Interrupted`
    /// * `Err(CrawlError)` - The run failed; it is recorded as `Failed`
    pub async fn run(self) -> Result<CrawlReport<S>, CrawlError> {
        let Self {
            config,
            mut store,
            fetcher,
            config_hash,
            shutdown,
        } = self;

        let run_id = store.begin_run(&config_hash)?;
        tracing::info!("Starting crawl run {}", run_id);

        let pipeline = Arc::new(Pipeline::new());
        match resume(&mut store, &pipeline, &config.crawl) {
            Ok(ResumePoint::Resumed { pending }) => {
                tracing::info!("Resuming with {} pending pages", pending)
            }
            Ok(ResumePoint::Seeded) => {
                tracing::info!("Seeded frontier with {}", config.crawl.seed)
            }
            Ok(ResumePoint::AlreadyComplete) => {
                tracing::info!("Nothing pending and {} already fetched", config.crawl.seed)
            }
            Err(e) => {
                tracing::error!("Failed to recover frontier: {}", e);
                if let Err(finish) = store.finish_run(run_id, RunStatus::Failed) {
                    tracing::error!("Failed to record run {}: {}", run_id, finish);
                }
                return Err(e.into());
            }
        }

        let token = shutdown.token();
        let persist_stop = CancellationToken::new();
        let stage = PersistenceStage::new(
            store,
            pipeline.clone(),
            LinkFilter::new(&config.filter),
            config.storage.commit_interval(),
            persist_stop.clone(),
            token.clone(),
        );
        // A panicking stage drops the guard and stops the crawl
        let stage_guard = token.clone().drop_guard();
        let persistence = tokio::spawn(async move {
            let done = stage.run().await;
            stage_guard.disarm();
            done
        });

        let mut pool = FetchPool::new(fetcher, pipeline.clone(), token.clone());
        if !pipeline.is_idle() {
            pool.grow_to(config.pool.initial_size);
        }

        let completed = control_loop(&config, &pipeline, &mut pool, &token).await;

        // Drain: workers first, then persistence
        shutdown.trigger();
        pool.shutdown().await;
        persist_stop.cancel();
        // The store went down with a panicked stage, so the run row cannot
        // be updated and stays `running`
        let (mut store, outcome) = match persistence.await {
            Ok(done) => done,
            Err(e) => {
                tracing::error!("Persistence stage aborted: {}", e);
                tracing::error!("Run {} left as running", run_id);
                return Err(CrawlError::Join(e));
            }
        };

        let status = match (&outcome, completed) {
            (Err(_), _) => RunStatus::Failed,
            (Ok(()), true) => RunStatus::Completed,
            (Ok(()), false) => RunStatus::Interrupted,
        };
        store.finish_run(run_id, status)?;
        outcome?;

        let stats = pipeline.stats.snapshot();
        let frontier_remaining = pipeline.frontier.len();
        tracing::info!(
            "Crawl run {} {}: {} pages fetched, {} links recorded, {} fetch failures, {} pending",
            run_id,
            status.to_db_string(),
            stats.pages_fetched,
            stats.links_recorded,
            stats.fetch_failures,
            frontier_remaining
        );

        Ok(CrawlReport {
            run_id,
            status,
            stats,
            frontier_remaining,
            store,
        })
    }
}

/// Autoscaler ticks and completion checks
///
/// Returns true if the crawl ran out of work, false if it was shut down.
async fn control_loop<F: PageFetcher>(
    config: &Config,
    pipeline: &Pipeline,
    pool: &mut FetchPool<F>,
    token: &CancellationToken,
) -> bool {
    let autoscaler = Autoscaler::new(&config.autoscale, &config.pool);

    let tick = config.autoscale.tick_interval();
    let mut ticker = tokio::time::interval_at(Instant::now() + tick, tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut idle_poll = tokio::time::interval(IDLE_POLL_INTERVAL);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => return false,
            _ = idle_poll.tick() => {
                if pipeline.is_idle() {
                    tracing::info!("No pages left to fetch");
                    return true;
                }
            }
            _ = ticker.tick() => {
                pool.reap().await;

                let depth = pipeline.results.len();
                let decision = autoscaler.decide(depth, pool.size());
                if decision != ScaleDecision::Hold {
                    let target = Autoscaler::apply(decision, pool.size());
                    tracing::debug!("Autoscaler {:?}: {} workers", decision, target);
                    pool.resize_to(target);
                }

                log_status(pipeline, pool.size());
            }
        }
    }
}

fn log_status(pipeline: &Pipeline, pool_size: usize) {
    tracing::info!(
        "Progress: {} pages fetched, {} links, {} in frontier, {} awaiting persistence, {} workers",
        pipeline.stats.pages_fetched(),
        pipeline.stats.links_recorded(),
        pipeline.frontier.len(),
        pipeline.results.len(),
        pool_size
    );
}
