//! Configuration module for linkgraph
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use linkgraph::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linkgraph.toml")).unwrap();
//! println!("Crawl starts at: {}", config.crawl.seed);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AutoscaleConfig, Config, CrawlConfig, ExclusionRule, FetcherConfig, FilterConfig, PoolConfig,
    StorageConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, effective_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
