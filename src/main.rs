//! Site-Atlas main entry point
//!
//! This is the command-line interface for the Site-Atlas dependency mapper.

use anyhow::{bail, Context};
use clap::Parser;
use site_atlas::config::{read_config_with_hash, validate, Config};
use site_atlas::output::{print_report, write_markdown_report};
use site_atlas::url::parse_seed;
use site_atlas::Crawler;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Site-Atlas: maps the external domains a website depends on
///
/// Site-Atlas crawls the pages of one site, starting from a seed URL and
/// staying on its scheme and host, and lists every external domain the site
/// loads scripts, images and stylesheets from.
#[derive(Parser, Debug)]
#[command(name = "site-atlas")]
#[command(version)]
#[command(about = "Maps the external domains a website depends on", long_about = None)]
struct Cli {
    /// URL to start crawling from (overrides `seed-url` in the config file)
    #[arg(value_name = "SEED_URL")]
    seed: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum link depth from the seed
    #[arg(long)]
    max_depth: Option<u32>,

    /// Number of concurrent workers
    #[arg(long)]
    workers: Option<usize>,

    /// Capacity of the task queue
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// How long to wait on a full queue before dropping a link, in milliseconds
    #[arg(long)]
    enqueue_timeout_ms: Option<u64>,

    /// Write a markdown summary to this path
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(&config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_atlas=info,warn"),
            1 => EnvFilter::new("site_atlas=debug,info"),
            2 => EnvFilter::new("site_atlas=trace,debug"),
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

/// Loads the config file (if any), applies command-line overrides and validates the result
///
/// Validation runs once, after the overrides, so a flag can fix a bad file value.
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = read_config_with_hash(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(seed) = &cli.seed {
        config.crawler.seed_url = Some(seed.clone());
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(capacity) = cli.queue_capacity {
        config.crawler.queue_capacity = capacity;
    }
    if let Some(timeout) = cli.enqueue_timeout_ms {
        config.crawler.enqueue_timeout_ms = timeout;
    }
    if let Some(summary) = &cli.summary {
        config.output.summary_path = Some(summary.display().to_string());
    }

    validate(&config).context("invalid configuration")?;

    if config.crawler.seed_url.is_none() {
        bail!("no seed URL given; pass one on the command line or set crawler.seed-url");
    }

    Ok(config)
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Site-Atlas Dry Run ===\n");

    println!("Crawler Configuration:");
    if let Some(seed) = &config.crawler.seed_url {
        println!("  Seed URL: {}", seed);
    }
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Workers: {}", config.crawler.workers);
    println!("  Queue capacity: {}", config.crawler.queue_capacity);
    println!("  Enqueue timeout: {}ms", config.crawler.enqueue_timeout_ms);

    println!("\nFetch:");
    println!("  User agent: {}", config.fetch.user_agent);
    println!("  Request timeout: {}s", config.fetch.request_timeout_secs);
    println!("  Connect timeout: {}s", config.fetch.connect_timeout_secs);

    println!("\nOutput:");
    match &config.output.summary_path {
        Some(path) => println!("  Summary: {}", path),
        None => println!("  Summary: (console only)"),
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    let seed = config
        .crawler
        .seed_url
        .as_deref()
        .context("no seed URL configured")?;
    let seed = parse_seed(seed).with_context(|| format!("invalid seed URL '{}'", seed))?;

    let crawler = Crawler::from_config(config).context("failed to build crawler")?;

    let report = match crawler.run(seed).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    print_report(&report);

    if let Some(path) = &config.output.summary_path {
        write_markdown_report(&report, Path::new(path))
            .with_context(|| format!("failed to write summary to {}", path))?;
    }

    Ok(())
}
