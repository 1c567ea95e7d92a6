//! Configuration module for the media crawler
//!
//! Settings come from an optional TOML file; every key has a default so the
//! crawler also runs with no file at all. Command-line flags are applied on
//! top of the loaded values by the binary.
//!
//! # Example
//!
//! ```no_run
//! use media_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Max depth: {:?}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, UserAgentConfig, DEFAULT_DATABASE_PATH,
    DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_VISITED_CACHE_CAPACITY,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, validate_seed_url};
