//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{FrontierItem, HistoryRecord};
use crate::CrawlerError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
///
/// Statements run in autocommit mode, so every enqueue, removal and history
/// row is durable as soon as the call returns.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(CrawlerError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, CrawlerError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, CrawlerError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Flushes the write-ahead log and closes the connection
    pub fn close(self) -> Result<(), CrawlerError> {
        // A checkpoint failure must not keep the connection from closing
        if let Err(e) = self
            .conn
            .query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))
        {
            tracing::debug!("WAL checkpoint skipped: {}", e);
        }
        self.conn.close().map_err(|(_, e)| CrawlerError::Database(e))
    }
}

fn frontier_item_from_row(row: &Row<'_>) -> rusqlite::Result<FrontierItem> {
    Ok(FrontierItem {
        id: row.get(0)?,
        parent_id: row.get(1)?,
        depth: row.get(2)?,
        url: row.get(3)?,
    })
}

fn parse_timestamp(raw: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StorageError::Serialization(format!("Bad timestamp '{}': {}", raw, e)))
}

impl Storage for SqliteStorage {
    // ===== Frontier =====

    fn enqueue(&mut self, parent_id: i64, depth: u32, url: &str) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO queue (parent, depth, url) VALUES (?1, ?2, ?3)",
            params![parent_id, depth, url],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn peek_oldest(&self) -> StorageResult<Option<FrontierItem>> {
        let item = self
            .conn
            .query_row(
                "SELECT id, parent, depth, url FROM queue ORDER BY id ASC LIMIT 1",
                [],
                frontier_item_from_row,
            )
            .optional()?;
        Ok(item)
    }

    fn remove(&mut self, id: i64) -> StorageResult<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM queue WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StorageError::ItemNotFound(id));
        }
        Ok(())
    }

    fn is_queued(&self, url: &str) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM queue WHERE url = ?1 LIMIT 1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn frontier_len(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM queue", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn frontier_items(&self) -> StorageResult<Vec<FrontierItem>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, parent, depth, url FROM queue ORDER BY id ASC")?;

        let items = stmt
            .query_map([], frontier_item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    // ===== History =====

    fn record_visit(&mut self, crawl_id: i64, parent_id: i64, url: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO crawl_index (crawlid, parentid, url, timestamp) VALUES (?1, ?2, ?3, ?4)",
            params![crawl_id, parent_id, url, now],
        )?;
        Ok(())
    }

    fn was_visited(&self, url: &str) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM crawl_index WHERE url = ?1 LIMIT 1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn history_len(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM crawl_index", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn history(&self) -> StorageResult<Vec<HistoryRecord>> {
        self.query_history(
            "SELECT crawlid, parentid, url, timestamp FROM crawl_index ORDER BY rowid ASC",
            params![],
        )
    }

    fn history_for(&self, url: &str) -> StorageResult<Vec<HistoryRecord>> {
        self.query_history(
            "SELECT crawlid, parentid, url, timestamp FROM crawl_index WHERE url = ?1 ORDER BY rowid ASC",
            params![url],
        )
    }
}

impl SqliteStorage {
    fn query_history<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> StorageResult<Vec<HistoryRecord>> {
        let mut stmt = self.conn.prepare(sql)?;

        let rows = stmt
            .query_map(params, |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(crawl_id, parent_id, url, raw_ts)| {
                Ok(HistoryRecord {
                    crawl_id,
                    parent_id,
                    url,
                    timestamp: parse_timestamp(&raw_ts)?,
                })
            })
            .collect()
    }
}
