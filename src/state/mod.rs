//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `FetchState`: whether a recorded page has had its outbound links resolved
//! - `CrawlStats`: process-wide counters shared between the persistence stage and status output

mod fetch_state;
mod stats;

// Re-export main types
pub use fetch_state::FetchState;
pub use stats::{CrawlStats, StatsSnapshot};
