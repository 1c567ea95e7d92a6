//! Storage module for persisting crawl state
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - The FIFO frontier of pending work items
//! - The append-only crawl history used for deduplication and audit

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::CrawlerError;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(CrawlerError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, CrawlerError> {
    SqliteStorage::new(path)
}

/// A pending unit of crawl work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierItem {
    /// Store-assigned id, increasing with insertion order
    pub id: i64,
    /// Id of the item whose page linked here; 0 for the seed
    pub parent_id: i64,
    /// Link distance from the seed
    pub depth: u32,
    pub url: String,
}

/// One row of crawl history
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    /// Id of the frontier item that was fetched
    pub crawl_id: i64,
    pub parent_id: i64,
    pub url: String,
    pub timestamp: DateTime<Utc>,
}
