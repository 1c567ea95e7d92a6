//! Output module for crawl results
//!
//! This module handles:
//! - Appending extracted media records to the tabular result file
//! - Counting what a crawl run did and reporting it at exit

mod csv_output;
pub mod stats;
mod traits;

pub use csv_output::CsvSink;
pub use stats::{print_statistics, CrawlStats};
pub use traits::{OutputError, OutputResult, OutputSink};
