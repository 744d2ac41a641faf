//! Product-Scout main entry point
//!
//! This is the command-line interface for the Product-Scout crawler.

use anyhow::{bail, Context};
use clap::Parser;
use product_scout::config::{load_config_with_hash, validate, validate_output_filename, Config};
use product_scout::crawler::{crawl, Coordinator};
use product_scout::output::{log_report, print_report};
use product_scout::{ensure_scheme, server};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Product-Scout: product page discovery for e-commerce sites
///
/// Product-Scout crawls from seed URLs, follows internal links up to a depth
/// limit, and writes the URLs that match a per-host product pattern to a JSON
/// snapshot file as they are found.
#[derive(Parser, Debug)]
#[command(name = "product-scout")]
#[command(version = "1.0.0")]
#[command(about = "Product page discovery crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Seed URL to crawl (repeatable); replaces the seeds from the config file
    #[arg(long = "seed", value_name = "URL")]
    seeds: Vec<String>,

    /// Override crawler.max-depth
    #[arg(long)]
    max_depth: Option<u32>,

    /// Override crawler.concurrency
    #[arg(long)]
    concurrency: Option<u32>,

    /// Override crawler.max-pages
    #[arg(long)]
    max_pages: Option<usize>,

    /// Snapshot file name inside output.output-dir
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Run the HTTP API instead of a one-shot crawl
    #[arg(long, conflicts_with = "dry_run")]
    serve: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    apply_overrides(&mut config, &cli)?;

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    if cli.dry_run {
        handle_dry_run(&config, cli.output.as_deref())
    } else if cli.serve {
        server::serve(config, cancel).await.context("Server failed")
    } else {
        handle_crawl(&config, cli.output.as_deref(), cancel).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` wins over the flags when it is set.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
            0 => EnvFilter::new("product_scout=info,tower_http=info,warn"),
            1 => EnvFilter::new("product_scout=debug,tower_http=debug,info"),
            2 => EnvFilter::new("product_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        })
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Folds command-line overrides into the loaded config and re-validates it
fn apply_overrides(config: &mut Config, cli: &Cli) -> anyhow::Result<()> {
    if !cli.seeds.is_empty() {
        config.crawler.seeds = cli.seeds.clone();
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = concurrency;
    }
    if cli.max_pages.is_some() {
        config.crawler.max_pages = cli.max_pages;
    }
    if let Some(output) = &cli.output {
        validate_output_filename(output)?;
    }

    validate(config).context("Invalid command-line override")?;
    Ok(())
}

/// Ctrl-C cancels whatever is running; a second Ctrl-C is left to the default handler
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after in-flight pages");
            cancel.cancel();
        }
    });
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, output: Option<&str>) -> anyhow::Result<()> {
    let coordinator = Coordinator::from_config(config)?;

    println!("=== Product-Scout Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Concurrency per seed: {}", config.crawler.concurrency);
    match config.crawler.max_pages {
        Some(max) => println!("  Max pages per seed: {}", max),
        None => println!("  Max pages per seed: unlimited"),
    }
    println!(
        "  Fetch attempts: {} (initial backoff {}ms)",
        config.crawler.max_retries, config.crawler.initial_backoff_ms
    );

    println!("\nFetch Tiers: {}", coordinator.tier_names().join(" -> "));
    println!("  User agent: {}", config.fetch.user_agent);

    println!("\nOutput:");
    println!("  Snapshot file: {}", config.output_path(output).display());

    println!("\nSeeds ({}):", config.crawler.seeds.len());
    for seed in &config.crawler.seeds {
        println!("  - {}", ensure_scheme(seed));
    }

    let hosts = coordinator.classifier().hosts();
    println!("\nProduct Patterns ({} hosts):", hosts.len());
    for host in hosts {
        if let Some(pattern) = coordinator.classifier().pattern_for(host) {
            println!("  - {}: {}", host, pattern.as_str());
        }
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling with {} seed URLs",
        config.crawler.seeds.len()
    );

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &Config,
    output: Option<&str>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    if config.crawler.seeds.is_empty() {
        bail!("No seeds to crawl: pass --seed or set crawler.seeds");
    }

    let output_path = config.output_path(output);
    tracing::info!(
        "Crawling {} seeds, writing to {}",
        config.crawler.seeds.len(),
        output_path.display()
    );

    match crawl(config, &config.crawler.seeds, output_path, cancel).await {
        Ok(report) => {
            log_report(&report);
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
