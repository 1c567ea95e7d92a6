//! Media Crawler main entry point
//!
//! This is the command-line interface for the media crawler.

use anyhow::Context;
use clap::Parser;
use media_crawler::config::{load_config_with_hash, validate, validate_seed_url, Config};
use media_crawler::crawler::crawl;
use media_crawler::output::print_statistics;
use media_crawler::CrawlerError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Media Crawler: finds audio files reachable from a web page
///
/// Crawls breadth-first from SEED_URL, appending one CSV row per audio file
/// (artist, title, album, duration, url) to OUTPUT. The frontier and history
/// are kept in a SQLite database, so running again against the same database
/// resumes an interrupted crawl.
#[derive(Parser, Debug)]
#[command(name = "media-crawler")]
#[command(version = "1.0.0")]
#[command(about = "Crawls a site for audio files and indexes their tags", long_about = None)]
struct Cli {
    /// URL to start crawling from
    #[arg(value_name = "SEED_URL")]
    seed_url: String,

    /// CSV file to append results to
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Maximum crawl depth (links on pages at this depth are not followed)
    #[arg(short, long, value_name = "MAX_CRAWL_DEPTH")]
    depth: Option<u32>,

    /// SQLite database holding the frontier and crawl history
    #[arg(short = 'b', long, value_name = "FILE")]
    database: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("for help use --help");
            return ExitCode::from(2);
        }
    };

    tracing::info!(
        "Crawling from {} (max depth: {}, database: {})",
        cli.seed_url,
        config
            .crawler
            .max_depth
            .map_or_else(|| "unlimited".to_string(), |d| d.to_string()),
        config.output.database_path
    );

    let (stats, result) = crawl(&config, Some(&cli.seed_url), &cli.output).await;

    if !cli.quiet {
        print_statistics(&stats);
    }

    match result {
        Ok(()) => {
            tracing::info!("Crawl completed successfully");
            ExitCode::SUCCESS
        }
        Err(CrawlerError::Interrupted) => {
            println!("User abort - exiting..");
            ExitCode::from(130)
        }
        Err(e) => {
            tracing::error!("Crawl failed: {:?}", anyhow::Error::from(e));
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("media_crawler=info,warn"),
            1 => EnvFilter::new("media_crawler=debug,info"),
            2 => EnvFilter::new("media_crawler=trace,debug"),
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

/// Loads the configuration file, if any, and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    validate_seed_url(&cli.seed_url)?;

    let mut config = match &cli.config {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(depth) = cli.depth {
        config.crawler.max_depth = Some(depth);
    }
    if let Some(database) = &cli.database {
        config.output.database_path = database.to_string_lossy().into_owned();
    }

    validate(&config).context("Invalid command-line options")?;
    Ok(config)
}
