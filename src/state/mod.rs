//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: lifecycle of the crawl loop, from idle through per-item
//!   processing to drained or aborted

mod crawl_state;

pub use crawl_state::CrawlState;
