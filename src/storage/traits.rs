//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::{FrontierItem, HistoryRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Frontier item not found: {0}")]
    ItemNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Covers the two persisted tables of a crawl: the frontier queue and the
/// visit history. Duplicate URLs are accepted by both; callers run the
/// dedup check before enqueueing.
pub trait Storage {
    // ===== Frontier =====

    /// Appends a work item to the frontier
    ///
    /// # Arguments
    ///
    /// * `parent_id` - Id of the item whose page linked here (0 for the seed)
    /// * `depth` - Link distance from the seed
    /// * `url` - Absolute URL to fetch
    ///
    /// # Returns
    ///
    /// The id assigned to the new item. Ids grow with insertion order.
    fn enqueue(&mut self, parent_id: i64, depth: u32, url: &str) -> StorageResult<i64>;

    /// Returns the oldest item still in the frontier without removing it
    fn peek_oldest(&self) -> StorageResult<Option<FrontierItem>>;

    /// Removes a finished item from the frontier
    fn remove(&mut self, id: i64) -> StorageResult<()>;

    /// Checks whether any queued item references this URL
    fn is_queued(&self, url: &str) -> StorageResult<bool>;

    /// Counts items waiting in the frontier
    fn frontier_len(&self) -> StorageResult<u64>;

    /// Lists the frontier in dequeue order
    fn frontier_items(&self) -> StorageResult<Vec<FrontierItem>>;

    // ===== History =====

    /// Appends a history row for a fetched item
    fn record_visit(&mut self, crawl_id: i64, parent_id: i64, url: &str) -> StorageResult<()>;

    /// Checks whether this URL was fetched by any previous item
    fn was_visited(&self, url: &str) -> StorageResult<bool>;

    /// Counts history rows
    fn history_len(&self) -> StorageResult<u64>;

    /// Lists history rows in the order they were written
    fn history(&self) -> StorageResult<Vec<HistoryRecord>>;

    /// Lists every visit of one URL, oldest first
    fn history_for(&self, url: &str) -> StorageResult<Vec<HistoryRecord>>;
}
