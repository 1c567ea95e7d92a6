//! Database schema definitions
//!
//! Two tables back a crawl: `queue` is the frontier and `crawl_index` is the
//! append-only visit history. Both are indexed on `url` because every
//! discovered link is checked against them before it is enqueued.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Crawl history: one row per dequeued item that was fetched.
-- url is not unique: the seed may be crawled again on purpose.
CREATE TABLE IF NOT EXISTS crawl_index (
    crawlid INTEGER NOT NULL,
    parentid INTEGER NOT NULL,
    url TEXT NOT NULL,
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS crawl_index_url_idx ON crawl_index(url);

-- Frontier. AUTOINCREMENT keeps ids strictly increasing even after the
-- newest row is deleted, so insertion order is id order.
CREATE TABLE IF NOT EXISTS queue (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    parent INTEGER NOT NULL,
    depth INTEGER NOT NULL,
    url TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS queue_url_idx ON queue(url);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
