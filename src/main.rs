//! Sitemaper main entry point
//!
//! This is the command-line interface for the Sitemaper sitemap generator.

use anyhow::Context;
use clap::Parser;
use sitemaper::config::{resolve_config, Config, ConfigOverrides};
use sitemaper::crawler::generate_sitemap;
use sitemaper::output::print_statistics;
use sitemaper::sitemap::validate_file;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Sitemaper: simple tool for generating sitemaps for your website
///
/// Sitemaper crawls a website breadth-first from the given URL, follows
/// same-origin links up to the given depth, and writes a sitemaps.org
/// sitemap.xml. Published URLs can be rewritten to another origin.
#[derive(Parser, Debug)]
#[command(name = "sitemaper")]
#[command(version = "1.0.0")]
#[command(about = "Simple tool for generating sitemaps for your website.", long_about = None)]
struct Cli {
    /// The URL of the website to crawl [default: https://www.example.com]
    #[arg(short, long, value_name = "URL")]
    website: Option<String>,

    /// The origin that replaces the website's origin in the sitemap
    #[arg(short, long, value_name = "URL")]
    replacer: Option<String>,

    /// Depth of the website to crawl [default: 10]
    #[arg(short, long, value_name = "NUMBER")]
    depth: Option<u32>,

    /// Output path for the sitemap.xml [default: ./sitemap.xml]
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Change frequency for the sitemap (always, hourly, daily, weekly, monthly, yearly, never) [default: daily]
    #[arg(short = 'f', long, value_name = "VALUE")]
    changefreq: Option<String>,

    /// Maximum number of pages fetched at once [default: 4]
    #[arg(long, value_name = "NUMBER")]
    concurrency: Option<u32>,

    /// Per-request timeout in seconds [default: 30]
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Path to a TOML configuration file; flags override its values
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Validate an existing sitemap file instead of crawling
    #[arg(long, value_name = "FILE", conflicts_with_all = ["website", "replacer", "depth", "output", "changefreq"])]
    validate: Option<PathBuf>,

    /// Print crawl statistics when done
    #[arg(long)]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Some(path) = &cli.validate {
        return Ok(handle_validate(path));
    }

    let config = resolve_config(
        cli.config.as_deref(),
        ConfigOverrides {
            website: cli.website,
            replacer: cli.replacer,
            depth: cli.depth,
            output: cli.output,
            changefreq: cli.changefreq,
            max_concurrent_fetches: cli.concurrency,
            fetch_timeout_secs: cli.timeout,
        },
    )
    .context("Invalid configuration")?;

    handle_generate(&config, cli.stats).await?;

    Ok(ExitCode::SUCCESS)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemaper=info,warn"),
            1 => EnvFilter::new("sitemaper=debug,info"),
            2 => EnvFilter::new("sitemaper=trace,debug"),
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

/// Handles the --validate mode: checks a sitemap file and reports every problem
fn handle_validate(path: &std::path::Path) -> ExitCode {
    tracing::info!("Validating sitemap: {}", path.display());
    let result = validate_file(path);

    if result.valid {
        println!(
            "✓ {} is a valid sitemap ({} URLs)",
            path.display(),
            result.url_count
        );
        ExitCode::SUCCESS
    } else {
        println!(
            "✗ {} is not a valid sitemap ({} problem(s)):",
            path.display(),
            result.errors.len()
        );
        for error in &result.errors {
            println!("  - {}", error);
        }
        ExitCode::FAILURE
    }
}

/// Handles the main crawl operation
async fn handle_generate(config: &Config, show_stats: bool) -> anyhow::Result<()> {
    tracing::info!(
        "Website: {}, depth: {}, changefreq: {}, output: {}",
        config.crawler.website,
        config.crawler.depth,
        config.crawler.changefreq,
        config.output.path
    );

    let outcome = generate_sitemap(config)
        .await
        .with_context(|| format!("Failed to generate sitemap for {}", config.crawler.website))?;

    if show_stats {
        print_statistics(&outcome.statistics);
    }

    tracing::info!(
        "Sitemap with {} URL(s) written to {}",
        outcome.pages.len(),
        config.output.path
    );

    Ok(())
}
