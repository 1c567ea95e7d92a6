//! Crawler module for fetching and processing resources
//!
//! This module contains the core crawling logic, including:
//! - Fetching resources over HTTP or from local files
//! - Decoding pages and extracting their links
//! - Duplicate detection against the session cache and the store
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod ledger;
mod parser;

pub use crate::output::CrawlStats;
pub use coordinator::Coordinator;
pub use fetcher::{
    build_http_client, fetch_file, fetch_http, guess_content_type, FetchedResource, Fetcher,
    HttpFetcher,
};
pub use ledger::VisitLedger;
pub use parser::{charset_from_content_type, decode_body, extract_links};

use crate::config::Config;
use crate::CrawlerError;
use std::path::Path;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the store, HTTP client and output file
/// 2. Enqueue the seed, if one is given
/// 3. Process the frontier until it drains or Ctrl-C is pressed
/// 4. Flush the output and close the store, whatever the outcome
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed` - Starting URL; `None` resumes the persisted frontier only
/// * `output_path` - CSV file results are appended to
///
/// # Returns
///
/// The counters reached before the crawl stopped, and how it stopped.
/// Counters are returned even on failure so they can be reported.
pub async fn crawl(
    config: &Config,
    seed: Option<&str>,
    output_path: &Path,
) -> (CrawlStats, Result<(), CrawlerError>) {
    let mut coordinator = match Coordinator::from_config(config, output_path) {
        Ok(coordinator) => coordinator,
        Err(e) => return (CrawlStats::default(), Err(e)),
    };

    let seeded = match seed {
        Some(url) => coordinator.seed(url).map(|_| ()),
        None => Ok(()),
    };

    let result = match seeded {
        Ok(()) => coordinator
            .run_until(interrupt_signal())
            .await
            .map(|_| ()),
        Err(e) => Err(e),
    };

    let stats = coordinator.stats();
    let cleanup = coordinator.finish().map(|_| ());

    // The crawl error wins over a cleanup error
    (stats, result.and(cleanup))
}

/// Resolves when the process receives Ctrl-C
async fn interrupt_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
