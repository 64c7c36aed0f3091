//! Output module for reporting on the stored link graph
//!
//! This module handles:
//! - Loading page, link and run totals from the store
//! - Rendering them for the `--stats` command

pub mod stats;

pub use stats::{format_statistics, load_statistics, print_statistics, CrawlStatistics};
