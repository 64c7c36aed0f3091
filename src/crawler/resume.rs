//! Startup recovery from the link store
//!
//! The store is the only state that survives a restart. Whatever is still
//! pending there becomes the new frontier; counters are re-derived from
//! stored rows rather than trusted from a previous process.

use crate::config::CrawlConfig;
use crate::crawler::pipeline::Pipeline;
use crate::storage::{LinkStore, StorageResult};

/// How a crawl picked up its work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumePoint {
    /// Pending pages from an earlier run were put back on the frontier
    Resumed { pending: usize },

    /// Fresh store; the seed page was created and scheduled
    Seeded,

    /// Nothing pending and the seed already fetched
    AlreadyComplete,
}

/// Rebuilds the frontier and counters for a new run
pub fn resume<S: LinkStore>(
    store: &mut S,
    pipeline: &Pipeline,
    crawl: &CrawlConfig,
) -> StorageResult<ResumePoint> {
    pipeline.stats.reconcile(store.stats()?);

    let pending = store.list_pending()?;
    if !pending.is_empty() {
        let count = pending.len();
        for identifier in pending {
            pipeline.schedule(identifier);
        }
        return Ok(ResumePoint::Resumed { pending: count });
    }

    if store.ensure_page_exists(&crawl.seed, &crawl.seed_title, true)? {
        pipeline.schedule(crawl.seed.clone());
        Ok(ResumePoint::Seeded)
    } else {
        Ok(ResumePoint::AlreadyComplete)
    }
}
