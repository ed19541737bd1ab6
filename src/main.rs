//! Sitesweep main entry point
//!
//! This is the command-line interface for the Sitesweep site crawler.

use anyhow::{bail, Context};
use clap::Parser;
use sitesweep::config::{load_config_with_hash, validate_params, Config};
use sitesweep::crawler::{crawl, listen_for_signals, FinishReason, Notification};
use sitesweep::output::{writer_for, OutputFormat};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sitesweep: a concurrent breadth-first site crawler
///
/// Sitesweep visits every page below the seed URL, records each page's
/// title and meta description, and writes one record per page to the
/// output file.
#[derive(Parser, Debug)]
#[command(name = "sitesweep")]
#[command(version)]
#[command(about = "A concurrent breadth-first site crawler", long_about = None)]
struct Cli {
    /// Seed URL; only links starting with it are followed
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Path of the result file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Result file format (csv or jsonl)
    #[arg(long, default_value = "csv")]
    format: OutputFormat,

    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Pause between pages of one worker, in milliseconds
    #[arg(short, long)]
    interval: Option<u64>,

    /// Number of concurrent workers
    #[arg(short, long)]
    connections: Option<u32>,

    /// Fetch attempts per page
    #[arg(short, long = "retry")]
    retry_count: Option<u32>,

    /// Treat `/a` and `/a/` as different pages
    #[arg(long)]
    keep_trailing_slash: bool,

    /// Treat URLs differing only in their query as different pages
    #[arg(long)]
    keep_query: bool,

    /// Treat URLs differing only in their fragment as different pages
    #[arg(long)]
    keep_hash: bool,

    /// Validate the settings and print them without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    if cli.dry_run {
        print_settings(&config);
        return Ok(());
    }

    handle_crawl(config, &cli).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitesweep=info,warn"),
            1 => EnvFilter::new("sitesweep=debug,info"),
            2 => EnvFilter::new("sitesweep=trace,debug"),
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

/// Merges the optional config file with command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let params = &mut config.crawl;
    if let Some(url) = &cli.url {
        params.url = url.clone();
    }
    if let Some(interval) = cli.interval {
        params.interval = interval;
    }
    if let Some(connections) = cli.connections {
        params.connections = connections;
    }
    if let Some(retry_count) = cli.retry_count {
        params.retry_count = retry_count;
    }
    if cli.keep_trailing_slash {
        params.ignore_trailing_slash = false;
    }
    if cli.keep_query {
        params.ignore_query_params = false;
    }
    if cli.keep_hash {
        params.ignore_hash = false;
    }

    if params.url.is_empty() {
        bail!("no seed URL given; pass one on the command line or set `url` in the config file");
    }
    validate_params(params)?;

    Ok(config)
}

/// Handles the --dry-run mode: shows the effective settings
fn print_settings(config: &Config) {
    let params = &config.crawl;
    println!("=== Sitesweep Dry Run ===\n");
    println!("Seed URL: {}", params.url);
    println!("  Connections: {}", params.connections);
    println!("  Interval: {}ms", params.interval);
    println!("  Attempts per page: {}", params.attempts());
    for attempt in 0..params.attempts() {
        println!(
            "    attempt {}: {}ms",
            attempt + 1,
            params.attempt_timeout(attempt).as_millis()
        );
    }
    println!("\nDedup:");
    println!("  Ignore trailing slash: {}", params.ignore_trailing_slash);
    println!("  Ignore query: {}", params.ignore_query_params);
    println!("  Ignore hash: {}", params.ignore_hash);
    println!("\nUser Agent: {}", config.fetch.user_agent);
    println!("\n✓ Configuration is valid");
}

/// Runs the crawl, writing results as they arrive
async fn handle_crawl(config: Config, cli: &Cli) -> anyhow::Result<()> {
    let file = File::create(&cli.output)
        .with_context(|| format!("failed to create {}", cli.output.display()))?;
    let mut writer = writer_for(cli.format, BufWriter::new(file));

    tracing::info!(
        "Crawling {} with {} connection(s)",
        config.crawl.url,
        config.crawl.connections
    );

    let mut crawl = crawl(config.crawl, &config.fetch).await?;
    let signals = listen_for_signals(crawl.handle.clone());

    let mut written = 0u64;
    let mut results_open = true;
    let mut finished = None;

    // The notification stream ends with the finish event; the result
    // stream may still hold records at that point.
    while results_open || finished.is_none() {
        tokio::select! {
            result = crawl.results.recv(), if results_open => match result {
                Some(result) => {
                    writer.write_result(&result)?;
                    written += 1;
                }
                None => results_open = false,
            },
            note = crawl.notifications.recv(), if finished.is_none() => match note {
                Some(Notification::Progress(progress)) => {
                    tracing::info!(
                        "{}/{} pages ({} queued) {}",
                        progress.processed,
                        progress.sum,
                        progress.queued,
                        progress.url.as_deref().unwrap_or_default()
                    );
                }
                Some(Notification::Finished { finished: reason }) => finished = Some(reason),
                None => finished = Some(crawl.handle.finished().await),
            },
        }
    }

    writer.finish()?;
    signals.abort();

    let reason = finished.unwrap_or(FinishReason::Error);
    let progress = crawl.handle.progress();
    tracing::info!(
        "{} {} records written to {} ({} of {} pages processed)",
        reason,
        written,
        cli.output.display(),
        progress.processed,
        progress.sum
    );

    if reason == FinishReason::Error {
        bail!("crawl ended with an internal error");
    }

    Ok(())
}
