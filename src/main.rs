//! nord-sound-crawler main entry point
//!
//! This is the command-line interface for the Nord sound library crawler.

use anyhow::Context;
use clap::Parser;
use nord_sound_crawler::config::{load_config_with_hash, validate, Config};
use nord_sound_crawler::crawler::{crawl, seed_requests};
use nord_sound_crawler::output::print_statistics;
use nord_sound_crawler::url::Category;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// nord-sound-crawler: walks the Nord sound library catalog
///
/// Every catalog category is crawled page by page through the site's JSON
/// data routes. Valid sound items are written as JSON Lines; invalid items
/// are logged and skipped.
#[derive(Parser, Debug)]
#[command(name = "nord-sound-crawler")]
#[command(version)]
#[command(about = "Crawls the Nord sound library catalog", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Product filter sent as `selected_product`
    #[arg(long, value_name = "ID")]
    product: Option<String>,

    /// Category to crawl; repeat for several (default: all)
    #[arg(long = "category", value_name = "NAME")]
    categories: Vec<Category>,

    /// JSON Lines file receiving the items
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and print the seed URLs without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load(&cli)?;
    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid configuration after command-line overrides")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("nord_sound_crawler=info,warn"),
            1 => EnvFilter::new("nord_sound_crawler=debug,info"),
            2 => EnvFilter::new("nord_sound_crawler=trace,debug"),
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

fn load(cli: &Cli) -> anyhow::Result<Config> {
    let Some(path) = &cli.config else {
        tracing::info!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(product) = &cli.product {
        config.crawler.selected_product = product.clone();
    }
    if !cli.categories.is_empty() {
        config.crawler.categories = cli.categories.clone();
    }
    if let Some(output) = &cli.output {
        config.output.items_path = output.display().to_string();
    }
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== nord-sound-crawler Dry Run ===\n");

    println!("Site:");
    println!("  Origin: {}", config.site.origin);
    println!("  Build id: {}", config.site.build_id);
    println!("  Locale: {}", config.site.locale);

    println!("\nCrawler Configuration:");
    println!("  Selected product: {}", config.crawler.selected_product);
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );
    println!("  Request timeout: {}ms", config.crawler.request_timeout);
    println!(
        "  Retries: {} (delay {}ms)",
        config.crawler.max_retries, config.crawler.retry_delay
    );

    println!("\nOutput:");
    println!("  Items: {}", config.output.items_path);

    let seeds = seed_requests(config);
    println!("\nSeed URLs ({}):", seeds.len());
    for seed in &seeds {
        println!("  - {}: {}", seed.category, seed.url);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let items_path = config.output.items_path.clone();
    tracing::info!(
        "Crawling {} categories into {}",
        config.crawler.categories.len(),
        items_path
    );

    let stats = crawl(config)
        .await
        .with_context(|| format!("Crawl into {} failed", items_path))?;

    print_statistics(&stats);
    Ok(())
}
