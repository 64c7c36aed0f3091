use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure for linkgraph
///
/// Every section is optional in the TOML file; missing keys take the
/// defaults below.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub crawl: CrawlConfig,
    pub pool: PoolConfig,
    pub autoscale: AutoscaleConfig,
    pub storage: StorageConfig,
    pub fetcher: FetcherConfig,
    pub filter: FilterConfig,
}

/// Where the crawl starts
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlConfig {
    /// Seed page identifier, in internal-reference form
    pub seed: String,

    /// Display name recorded for the seed page
    pub seed_title: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed: "./Philosophy".to_string(),
            seed_title: "Philosophy".to_string(),
        }
    }
}

/// Fetch pool sizing
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PoolConfig {
    /// Workers started before the first autoscaler tick
    pub initial_size: usize,

    /// The autoscaler never retires below this many workers
    pub min_size: usize,

    /// The autoscaler never grows beyond this many workers
    pub max_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_size: 20,
            min_size: 0,
            max_size: 40,
        }
    }
}

/// Result-queue watermarks and tick period for the autoscaler
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AutoscaleConfig {
    /// Result queue depth above which one worker is retired per tick
    pub high_watermark: usize,

    /// Result queue depth below which one worker is started per tick
    pub low_watermark: usize,

    /// Autoscaler tick period (milliseconds)
    pub tick_interval_ms: u64,
}

impl AutoscaleConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for AutoscaleConfig {
    fn default() -> Self {
        Self {
            high_watermark: 2000,
            low_watermark: 100,
            tick_interval_ms: 3000,
        }
    }
}

/// Link store location and commit batching
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Path to the SQLite database file
    pub database_path: String,

    /// Maximum time persisted results may sit uncommitted (milliseconds)
    pub commit_interval_ms: u64,
}

impl StorageConfig {
    pub fn commit_interval(&self) -> Duration {
        Duration::from_millis(self.commit_interval_ms)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "links.sqlite".to_string(),
            commit_interval_ms: 1000,
        }
    }
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetcherConfig {
    /// URL prefix that internal identifiers are appended to
    pub base_url: String,

    /// Whole-request timeout (seconds)
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl FetcherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://en.wikipedia.org/api/rest_v1/page/html/".to_string(),
            timeout_secs: 30,
            user_agent: concat!("linkgraph/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Inclusion filter rules applied to every discovered link
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FilterConfig {
    /// Prefix that marks an href as an internal reference
    pub internal_prefix: String,

    /// Keep absolute http(s) links as unfetched graph leaves
    pub record_external: bool,

    /// Hrefs matching any of these rules are dropped
    pub exclude: Vec<ExclusionRule>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            internal_prefix: "./".to_string(),
            record_external: true,
            exclude: vec![
                ExclusionRule::Contains("#cite".to_string()),
                ExclusionRule::Prefix("./Special:BookSources".to_string()),
            ],
        }
    }
}

/// A single exclusion rule
///
/// In TOML: `{ contains = "#cite" }`, `{ prefix = "./File:" }` or
/// `{ suffix = ".svg" }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExclusionRule {
    Contains(String),
    Prefix(String),
    Suffix(String),
}

impl ExclusionRule {
    /// Returns the rule's pattern text
    pub fn pattern(&self) -> &str {
        match self {
            Self::Contains(p) | Self::Prefix(p) | Self::Suffix(p) => p,
        }
    }
}
