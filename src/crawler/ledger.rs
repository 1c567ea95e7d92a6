//! Visit ledger: the crawler's duplicate detection
//!
//! A URL counts as seen if it is in the session cache of recently dequeued
//! URLs, is waiting in the frontier, or appears in the crawl history. The
//! session cache is a fixed-capacity LRU; once it evicts a URL the two
//! persistent checks still catch it.

use crate::storage::{Storage, StorageResult};
use lru::LruCache;
use std::num::NonZeroUsize;

/// Dedup predicate and history writer
pub struct VisitLedger {
    /// URLs dequeued during this process's lifetime
    session: LruCache<String, ()>,
}

impl VisitLedger {
    /// Creates a ledger whose session cache holds at most `capacity` URLs
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            session: LruCache::new(capacity),
        }
    }

    /// Remembers a URL that the crawl loop has just taken off the frontier
    pub fn mark_dequeued(&mut self, url: &str) {
        if let Some((evicted, _)) = self.session.push(url.to_string(), ()) {
            if evicted != url {
                tracing::trace!("Visited-URL cache full, evicted {}", evicted);
            }
        }
    }

    /// Checks whether a URL has been seen before
    ///
    /// Checks run cheapest first: session cache, frontier, history.
    pub fn was_seen<S: Storage + ?Sized>(&mut self, storage: &S, url: &str) -> StorageResult<bool> {
        if self.session.get(url).is_some() {
            tracing::trace!("{} seen this session", url);
            return Ok(true);
        }

        if storage.is_queued(url)? {
            tracing::trace!("{} already queued", url);
            return Ok(true);
        }

        if storage.was_visited(url)? {
            tracing::trace!("{} in crawl history", url);
            return Ok(true);
        }

        Ok(false)
    }

    /// Appends a history row for a fetched item
    pub fn record_visit<S: Storage + ?Sized>(
        &self,
        storage: &mut S,
        crawl_id: i64,
        parent_id: i64,
        url: &str,
    ) -> StorageResult<()> {
        storage.record_visit(crawl_id, parent_id, url)
    }

    /// Number of URLs currently held in the session cache
    pub fn session_len(&self) -> usize {
        self.session.len()
    }
}
