//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop. It is the only driver: every other
//! component is called from here, one frontier item at a time:
//! - Peek the oldest frontier item
//! - Fetch it and record the visit
//! - Route media to metadata extraction and pages to link extraction
//! - Remove the item from the frontier
//!
//! An item leaves the frontier only after it has been fully handled, so a
//! crawl stopped mid-item fetches that item again when resumed.

use crate::config::{Config, CrawlerConfig};
use crate::crawler::fetcher::{FetchedResource, Fetcher, HttpFetcher};
use crate::crawler::ledger::VisitLedger;
use crate::crawler::parser::{decode_body, extract_links};
use crate::media::{classify, extract_record, ContentClass, LoftyParser, MetadataParser};
use crate::output::{CrawlStats, CsvSink, OutputSink};
use crate::state::CrawlState;
use crate::storage::{open_storage, FrontierItem, SqliteStorage, Storage};
use crate::url::{resolve_link, ResolvedLink};
use crate::{CrawlerError, StageError};
use std::future::Future;
use std::path::Path;
use std::time::{Duration, Instant};
use url::Url;

/// Main crawler coordinator structure
///
/// Generic over its collaborators so tests can substitute the network, the
/// tag parser and the result file.
pub struct Coordinator<F, P, O> {
    storage: SqliteStorage,
    ledger: VisitLedger,
    fetcher: F,
    parser: P,
    sink: O,
    max_depth: Option<u32>,
    state: CrawlState,
    stats: CrawlStats,
}

impl Coordinator<HttpFetcher, LoftyParser, CsvSink> {
    /// Creates a coordinator wired to the real network, `lofty` and a CSV file
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `output_path` - CSV file to append results to
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Store, client and output are open
    /// * `Err(CrawlerError)` - One of them could not be opened
    pub fn from_config(config: &Config, output_path: &Path) -> Result<Self, CrawlerError> {
        let storage = open_storage(Path::new(&config.output.database_path))?;
        let fetcher = HttpFetcher::new(
            &config.user_agent,
            Duration::from_secs(config.crawler.fetch_timeout_secs),
        )?;
        let sink = CsvSink::open(output_path)?;

        Ok(Self::new(storage, fetcher, LoftyParser, sink, &config.crawler))
    }
}

impl<F, P, O> Coordinator<F, P, O>
where
    F: Fetcher,
    P: MetadataParser,
    O: OutputSink,
{
    /// Creates a coordinator from explicit collaborators
    pub fn new(
        storage: SqliteStorage,
        fetcher: F,
        parser: P,
        sink: O,
        config: &CrawlerConfig,
    ) -> Self {
        Self {
            storage,
            ledger: VisitLedger::new(config.visited_cache_capacity),
            fetcher,
            parser,
            sink,
            max_depth: config.max_depth,
            state: CrawlState::Idle,
            stats: CrawlStats::default(),
        }
    }

    /// Enqueues the seed URL at depth 0
    ///
    /// The seed skips the dedup check, so naming an already crawled URL
    /// crawls it again.
    pub fn seed(&mut self, url: &str) -> Result<i64, CrawlerError> {
        let id = self.storage.enqueue(0, 0, url)?;
        tracing::info!("Seeded frontier with {} (id {})", url, id);
        Ok(id)
    }

    /// Runs the crawl until the frontier is empty
    pub async fn run(&mut self) -> Result<CrawlStats, CrawlerError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the crawl until the frontier is empty or `shutdown` completes
    ///
    /// On shutdown the item in progress stays in the frontier and
    /// [`CrawlerError::Interrupted`] is returned. Cleanup is left to
    /// [`Coordinator::finish`], which the caller runs on every path.
    pub async fn run_until<S>(&mut self, shutdown: S) -> Result<CrawlStats, CrawlerError>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        tracing::info!(
            "Starting crawl with {} URLs in frontier",
            self.storage.frontier_len()?
        );
        let start_time = Instant::now();

        loop {
            let outcome = tokio::select! {
                biased;
                _ = &mut shutdown => None,
                step = self.step() => Some(step),
            };

            match outcome {
                None => {
                    self.abort();
                    return Err(CrawlerError::Interrupted);
                }
                Some(Err(e)) => {
                    self.abort();
                    return Err(e);
                }
                Some(Ok(false)) => break,
                Some(Ok(true)) => {
                    if self.stats.items_processed % 10 == 0 {
                        tracing::info!(
                            "Progress: {} items processed, {} media files, {} in frontier",
                            self.stats.items_processed,
                            self.stats.files_found,
                            self.storage.frontier_len()?
                        );
                    }
                }
            }
        }

        tracing::info!(
            "Crawl drained: {} items processed in {:?}",
            self.stats.items_processed,
            start_time.elapsed()
        );

        Ok(self.stats)
    }

    /// Processes the oldest frontier item
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - An item was processed and removed
    /// * `Ok(false)` - The frontier was empty
    /// * `Err(CrawlerError)` - A fatal storage or output failure
    pub async fn step(&mut self) -> Result<bool, CrawlerError> {
        self.transition(CrawlState::Running)?;

        let Some(item) = self.storage.peek_oldest()? else {
            tracing::info!("No URLs to fetch");
            self.transition(CrawlState::Drained)?;
            return Ok(false);
        };

        tracing::debug!("Crawling: {} (depth {})", item.url, item.depth);
        self.ledger.mark_dequeued(&item.url);

        self.process_item(&item).await?;

        self.storage.remove(item.id)?;
        self.stats.items_processed += 1;
        self.transition(CrawlState::ItemFinalized)?;

        Ok(true)
    }

    /// Flushes the output and closes the store
    ///
    /// Consumes the coordinator so cleanup cannot run twice.
    pub fn finish(mut self) -> Result<CrawlStats, CrawlerError> {
        let flushed = self.sink.flush();
        self.storage.close()?;
        flushed?;
        Ok(self.stats)
    }

    /// Current loop state
    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Counters for this run so far
    pub fn stats(&self) -> CrawlStats {
        self.stats
    }

    /// The backing store
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// The output sink
    pub fn sink(&self) -> &O {
        &self.sink
    }

    async fn process_item(&mut self, item: &FrontierItem) -> Result<(), CrawlerError> {
        let resource = match self.fetcher.fetch(&item.url).await {
            Ok(resource) => resource,
            Err(e) => {
                self.recover(item, e.into());
                return Ok(());
            }
        };

        if resource.final_url != item.url {
            tracing::debug!("{} redirected to {}", item.url, resource.final_url);
        }
        tracing::trace!(
            "Fetched {} (status {}, {} bytes)",
            item.url,
            resource.status_code,
            resource.body.len()
        );

        // History is written even if routing fails later
        self.ledger
            .record_visit(&mut self.storage, item.id, item.parent_id, &item.url)?;
        self.stats.items_fetched += 1;
        self.transition(CrawlState::ItemFetched)?;

        let class = classify(resource.content_type.as_deref());
        tracing::trace!("{} classified as {}", item.url, class);

        match class {
            ContentClass::Media => self.route_media(item, &resource)?,
            ContentClass::Page => self.route_page(item, &resource)?,
        }

        self.transition(CrawlState::ItemRouted)?;
        Ok(())
    }

    fn route_media(
        &mut self,
        item: &FrontierItem,
        resource: &FetchedResource,
    ) -> Result<(), CrawlerError> {
        self.stats.media_classified += 1;

        match extract_record(&self.parser, &resource.body, &item.url) {
            Ok(record) => {
                tracing::debug!(
                    "Media {}: artist={:?} title={:?} album={:?} duration={:.1}s",
                    item.url,
                    record.artist,
                    record.title,
                    record.album,
                    record.duration
                );
                self.sink.write_record(&record)?;
                self.stats.files_found += 1;
            }
            Err(e) => self.recover(item, e.into()),
        }

        Ok(())
    }

    fn route_page(
        &mut self,
        item: &FrontierItem,
        resource: &FetchedResource,
    ) -> Result<(), CrawlerError> {
        self.stats.pages_parsed += 1;

        let text = match decode_body(&resource.body, resource.content_type.as_deref()) {
            Ok(text) => text,
            Err(e) => {
                self.recover(item, e.into());
                String::from_utf8_lossy(&resource.body)
            }
        };

        let links: Vec<&str> = extract_links(&text).collect();
        self.stats.links_discovered += links.len() as u64;

        if let Some(max_depth) = self.max_depth {
            if item.depth >= max_depth {
                tracing::debug!(
                    "Depth limit {} reached at {}, dropping {} links",
                    max_depth,
                    item.url,
                    links.len()
                );
                self.stats.links_depth_suppressed += links.len() as u64;
                return Ok(());
            }
        }

        let page_url = match Url::parse(&item.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Cannot resolve links of {}: {}", item.url, e);
                return Ok(());
            }
        };

        for raw in links {
            let url = match resolve_link(raw, &page_url) {
                ResolvedLink::Absolute(url) => url,
                ResolvedLink::Fragment | ResolvedLink::Invalid => continue,
            };

            if self.ledger.was_seen(&self.storage, &url)? {
                self.stats.duplicates_skipped += 1;
                continue;
            }

            let id = self.storage.enqueue(item.id, item.depth + 1, &url)?;
            self.stats.links_enqueued += 1;
            tracing::trace!("Queued {} (id {}, depth {})", url, id, item.depth + 1);
        }

        Ok(())
    }

    /// Applies the recovery rule for a failed stage
    fn recover(&mut self, item: &FrontierItem, error: StageError) {
        match error {
            StageError::Transport(e) => {
                self.stats.fetch_failures += 1;
                tracing::debug!("Skipping {}: {}", item.url, e);
            }
            StageError::Decode(e) => {
                self.stats.decode_fallbacks += 1;
                tracing::debug!("Reading {} as raw bytes: {}", item.url, e);
            }
            StageError::MetadataParse(e) => {
                self.stats.metadata_failures += 1;
                tracing::debug!("No metadata from {}: {}", item.url, e);
            }
        }
    }

    fn transition(&mut self, next: CrawlState) -> Result<(), CrawlerError> {
        if !self.state.can_transition_to(next) {
            return Err(CrawlerError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    fn abort(&mut self) {
        if self.state.is_processing_item() {
            tracing::debug!("Item in progress stays in the frontier");
        }
        if self.state.can_transition_to(CrawlState::Aborted) {
            self.state = CrawlState::Aborted;
        }
        let remaining = self.storage.frontier_len().unwrap_or_default();
        tracing::warn!("Crawl aborted, {} URLs left in frontier", remaining);
    }
}
