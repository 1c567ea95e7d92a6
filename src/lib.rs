//! Media Crawler: a resumable breadth-first crawler for audio files
//!
//! This crate walks the link graph reachable from a seed URL, classifies each
//! fetched resource by its declared content type, and extracts tag metadata
//! (artist, title, album, duration) from every audio resource it finds. The
//! frontier and crawl history live in SQLite so an interrupted crawl can be
//! resumed from where it stopped.

pub mod config;
pub mod crawler;
pub mod media;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for crawler operations
///
/// Every variant here is fatal to a crawl run. Per-item failures are
/// reported through [`StageError`] and never abort the loop.
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },

    #[error("Crawl interrupted by user")]
    Interrupted,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Failure while fetching a single resource
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}")]
    Connect { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("Request to {url} failed: {message}")]
    Other { url: String, message: String },
}

/// Failure while decoding a page body to text
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Unknown charset label: {0}")]
    UnknownCharset(String),

    #[error("Malformed byte sequence for charset {0}")]
    Malformed(String),
}

/// Failure while reading tags out of a media resource
#[derive(Debug, Error)]
pub enum MetadataParseError {
    #[error("Unsupported or unrecognized media format")]
    UnsupportedFormat,

    #[error("Corrupt media stream: {0}")]
    Corrupt(String),

    #[error("Stream length unavailable")]
    MissingDuration,
}

/// Outcome of one recoverable crawl stage
///
/// The crawl loop matches on this to decide how an item is finalized.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    MetadataParse(#[from] MetadataParseError),
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlStats};
pub use media::{classify, ContentClass, OutputRecord};
pub use state::CrawlState;
pub use storage::{FrontierItem, HistoryRecord};
