//! Crawler module for the fetch/persist pipeline
//!
//! This module contains the core crawling logic, including:
//! - The page fetcher boundary, HTTP fetching and link extraction
//! - The link inclusion filter
//! - Frontier and result queues shared by the pipeline stages
//! - The fetch pool, its autoscaler and the persistence stage
//! - Resume, shutdown and overall crawl coordination

mod autoscaler;
mod coordinator;
mod fetcher;
mod filter;
mod parser;
mod persistence;
mod pipeline;
mod pool;
mod queue;
mod resume;
mod shutdown;

pub use autoscaler::{Autoscaler, ScaleDecision};
pub use coordinator::{Coordinator, CrawlReport};
pub use fetcher::{build_http_client, DiscoveredLink, FetchError, FetchedPage, HttpFetcher, PageFetcher};
pub use filter::{LinkClass, LinkFilter};
pub use parser::extract_links;
pub use persistence::PersistenceStage;
pub use pipeline::{CrawlResult, Pipeline};
pub use pool::FetchPool;
pub use queue::WorkQueue;
pub use resume::{resume, ResumePoint};
pub use shutdown::ShutdownCoordinator;

use crate::config::Config;
use crate::storage::SqliteLinkStore;
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the link store and build the HTTP fetcher
/// 2. Record a new run and recover the frontier
/// 3. Fetch and persist pages until none are left
/// 4. Drain and record the run outcome on SIGINT/SIGTERM
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `config_hash` - Hash recorded on the run record
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed or was interrupted cleanly
/// * `Err(CrawlError)` - Crawl failed
pub async fn crawl(
    config: Config,
    config_hash: String,
) -> Result<CrawlReport<SqliteLinkStore>, CrawlError> {
    let coordinator = Coordinator::open(config)?.with_config_hash(config_hash);

    let signals = coordinator.shutdown().install_signal_handlers();
    let report = coordinator.run().await;
    signals.abort();

    report
}
