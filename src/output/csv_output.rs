//! CSV result file
//!
//! Rows are `artist, title, album, duration, source_url` with no header.
//! The file is opened in append mode so a resumed crawl keeps adding to the
//! results of earlier runs.

use crate::media::OutputRecord;
use crate::output::traits::{OutputResult, OutputSink};
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Appends records to a CSV file
pub struct CsvSink {
    writer: csv::Writer<File>,
}

impl CsvSink {
    /// Opens (creating if needed) a CSV file for appending
    pub fn open(path: &Path) -> OutputResult<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        Ok(Self { writer })
    }
}

impl OutputSink for CsvSink {
    fn write_record(&mut self, record: &OutputRecord) -> OutputResult<()> {
        // Debug keeps the fraction on whole seconds: 180.0, not 180
        let duration = format!("{:?}", record.duration);
        self.writer.write_record([
            record.artist.as_deref().unwrap_or(""),
            record.title.as_deref().unwrap_or(""),
            record.album.as_deref().unwrap_or(""),
            duration.as_str(),
            record.source_url.as_str(),
        ])?;
        // Each row reaches the file before the next item is fetched
        self.writer.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}
