//! linkgraph main entry point
//!
//! This is the command-line interface for the linkgraph crawler.

use anyhow::Context;
use clap::Parser;
use linkgraph::config::{effective_config_hash, load_config_with_hash, validate, Config};
use linkgraph::crawler::crawl;
use linkgraph::storage::RunStatus;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// linkgraph: a resumable link-graph crawler
///
/// linkgraph crawls one content source outward from a seed page, records
/// every page and directed link it finds in SQLite, and picks up where it
/// left off when restarted.
#[derive(Parser, Debug)]
#[command(name = "linkgraph")]
#[command(version)]
#[command(about = "A resumable link-graph crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed page identifier, overriding the configuration
    #[arg(long, value_name = "ID")]
    seed: Option<String>,

    /// Database path, overriding the configuration
    #[arg(long, value_name = "PATH")]
    database: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load_effective_config(&cli)?;
    tracing::info!("Configuration ready (hash: {})", config_hash);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(config, config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkgraph=info,warn"),
            1 => EnvFilter::new("linkgraph=debug,info"),
            2 => EnvFilter::new("linkgraph=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any), applies command-line overrides and
/// validates the result
fn load_effective_config(cli: &Cli) -> anyhow::Result<(Config, String)> {
    let (mut config, file_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    let overridden = cli.seed.is_some() || cli.database.is_some();
    if let Some(seed) = &cli.seed {
        config.crawl.seed_title = seed_title(seed, &config.filter.internal_prefix);
        config.crawl.seed = seed.clone();
    }
    if let Some(database) = &cli.database {
        config.storage.database_path = database.clone();
    }
    validate(&config).context("Invalid configuration")?;

    let hash = match file_hash {
        Some(hash) if !overridden => hash,
        _ => effective_config_hash(&config)?,
    };

    Ok((config, hash))
}

/// Display name for a seed given on the command line
fn seed_title(seed: &str, internal_prefix: &str) -> String {
    seed.strip_prefix(internal_prefix)
        .unwrap_or(seed)
        .replace('_', " ")
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== linkgraph Dry Run ===\n");

    println!("Crawl:");
    println!("  Seed: {} ({})", config.crawl.seed, config.crawl.seed_title);

    println!("\nPool:");
    println!("  Initial size: {}", config.pool.initial_size);
    println!("  Size bounds: {}..={}", config.pool.min_size, config.pool.max_size);

    println!("\nAutoscale:");
    println!(
        "  Watermarks: low {} / high {}",
        config.autoscale.low_watermark, config.autoscale.high_watermark
    );
    println!("  Tick: {}ms", config.autoscale.tick_interval_ms);

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);
    println!("  Commit interval: {}ms", config.storage.commit_interval_ms);

    println!("\nFetcher:");
    println!("  Base URL: {}", config.fetcher.base_url);
    println!("  Timeout: {}s", config.fetcher.timeout_secs);
    println!("  User agent: {}", config.fetcher.user_agent);

    println!("\nFilter:");
    println!("  Internal prefix: {}", config.filter.internal_prefix);
    println!("  Record external links: {}", config.filter.record_external);
    println!("  Exclusion rules ({}):", config.filter.exclude.len());
    for rule in &config.filter.exclude {
        println!("    - {:?}", rule);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use linkgraph::output::{load_statistics, print_statistics};
    use linkgraph::storage::open_store;
    use std::path::Path;

    println!("Database: {}\n", config.storage.database_path);

    let store = open_store(Path::new(&config.storage.database_path))
        .with_context(|| format!("Failed to open {}", config.storage.database_path))?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: String) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling from {} into {}",
        config.crawl.seed,
        config.storage.database_path
    );

    match crawl(config, config_hash).await {
        Ok(report) => {
            match report.status {
                RunStatus::Completed => tracing::info!("Crawl completed successfully"),
                _ => tracing::info!(
                    "Crawl stopped; {} pages remain pending for the next run",
                    report.frontier_remaining
                ),
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
