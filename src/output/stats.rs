//! Counters for a single crawl run
//!
//! The crawl loop owns one [`CrawlStats`] and bumps it as items move through
//! the pipeline. Tests read the counters to see how often each stage ran.

/// What one crawl run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Frontier items dequeued and finalized
    pub items_processed: u64,

    /// Items fetched successfully (one history row each)
    pub items_fetched: u64,

    /// Fetched resources routed to link extraction
    pub pages_parsed: u64,

    /// Raw links found on pages, before resolution and dedup
    pub links_discovered: u64,

    /// Links that became new frontier items
    pub links_enqueued: u64,

    /// Links dropped because their URL was already seen
    pub duplicates_skipped: u64,

    /// Links dropped because their page sat at the depth limit
    pub links_depth_suppressed: u64,

    /// Resources classified as media
    pub media_classified: u64,

    /// Media records written to the output
    pub files_found: u64,

    /// Fetches that failed (network, timeout, bad status)
    pub fetch_failures: u64,

    /// Page bodies that fell back to lossy decoding
    pub decode_fallbacks: u64,

    /// Media resources whose tags could not be read
    pub metadata_failures: u64,
}

/// Prints run statistics to stdout
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Crawl Statistics ===\n");

    println!("Frontier:");
    println!("  Items processed: {}", stats.items_processed);
    println!("  Items fetched: {}", stats.items_fetched);
    println!("  Fetch failures: {}", stats.fetch_failures);
    println!();

    println!("Pages:");
    println!("  Pages parsed: {}", stats.pages_parsed);
    println!("  Links found: {}", stats.links_discovered);
    println!("  Links enqueued: {}", stats.links_enqueued);
    println!("  Already seen: {}", stats.duplicates_skipped);
    if stats.links_depth_suppressed > 0 {
        println!("  Beyond depth limit: {}", stats.links_depth_suppressed);
    }
    if stats.decode_fallbacks > 0 {
        println!("  Undecodable bodies: {}", stats.decode_fallbacks);
    }
    println!();

    println!("Media:");
    println!("  Media resources: {}", stats.media_classified);
    println!("  Unreadable media: {}", stats.metadata_failures);
    println!();

    println!("Total new files found: {}", stats.files_found);
}
