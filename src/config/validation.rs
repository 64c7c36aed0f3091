use crate::config::types::{
    AutoscaleConfig, Config, CrawlConfig, FetcherConfig, FilterConfig, PoolConfig, StorageConfig,
};
use crate::ConfigError;
use url::Url;

/// Upper bound on fetch workers a single crawl may run
const MAX_POOL_SIZE: usize = 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_filter_config(&config.filter)?;
    validate_crawl_config(&config.crawl, &config.filter)?;
    validate_pool_config(&config.pool)?;
    validate_autoscale_config(&config.autoscale)?;
    validate_storage_config(&config.storage)?;
    validate_fetcher_config(&config.fetcher)?;
    Ok(())
}

/// The seed must be something the fetch pool is allowed to fetch
fn validate_crawl_config(crawl: &CrawlConfig, filter: &FilterConfig) -> Result<(), ConfigError> {
    if crawl.seed.is_empty() {
        return Err(ConfigError::Validation("seed cannot be empty".to_string()));
    }

    if !crawl.seed.starts_with(&filter.internal_prefix) {
        return Err(ConfigError::Validation(format!(
            "seed '{}' must start with the internal prefix '{}'",
            crawl.seed, filter.internal_prefix
        )));
    }

    if crawl.seed.len() == filter.internal_prefix.len() {
        return Err(ConfigError::Validation(format!(
            "seed '{}' names no page after the internal prefix",
            crawl.seed
        )));
    }

    if crawl.seed_title.trim().is_empty() {
        return Err(ConfigError::Validation(
            "seed_title cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_pool_config(pool: &PoolConfig) -> Result<(), ConfigError> {
    if pool.max_size < 1 || pool.max_size > MAX_POOL_SIZE {
        return Err(ConfigError::Validation(format!(
            "pool max_size must be between 1 and {}, got {}",
            MAX_POOL_SIZE, pool.max_size
        )));
    }

    if pool.min_size > pool.max_size {
        return Err(ConfigError::Validation(format!(
            "pool min_size ({}) cannot exceed max_size ({})",
            pool.min_size, pool.max_size
        )));
    }

    if pool.initial_size < pool.min_size || pool.initial_size > pool.max_size {
        return Err(ConfigError::Validation(format!(
            "pool initial_size must be between min_size ({}) and max_size ({}), got {}",
            pool.min_size, pool.max_size, pool.initial_size
        )));
    }

    Ok(())
}

fn validate_autoscale_config(autoscale: &AutoscaleConfig) -> Result<(), ConfigError> {
    if autoscale.low_watermark >= autoscale.high_watermark {
        return Err(ConfigError::Validation(format!(
            "low_watermark ({}) must be below high_watermark ({})",
            autoscale.low_watermark, autoscale.high_watermark
        )));
    }

    if autoscale.tick_interval_ms == 0 {
        return Err(ConfigError::Validation(
            "tick_interval_ms must be > 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_storage_config(storage: &StorageConfig) -> Result<(), ConfigError> {
    if storage.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if storage.commit_interval_ms == 0 {
        return Err(ConfigError::Validation(
            "commit_interval_ms must be > 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_fetcher_config(fetcher: &FetcherConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&fetcher.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            fetcher.base_url
        )));
    }

    // Identifiers are appended verbatim
    if !fetcher.base_url.ends_with('/') {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must end with '/'",
            fetcher.base_url
        )));
    }

    if fetcher.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if fetcher.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_filter_config(filter: &FilterConfig) -> Result<(), ConfigError> {
    if filter.internal_prefix.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "internal_prefix cannot be empty".to_string(),
        ));
    }

    for rule in &filter.exclude {
        if rule.pattern().is_empty() {
            return Err(ConfigError::InvalidPattern(format!(
                "exclusion rule {:?} has an empty pattern",
                rule
            )));
        }
    }

    Ok(())
}
