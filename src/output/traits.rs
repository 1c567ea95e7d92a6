//! Output sink trait and error types

use crate::media::OutputRecord;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for extracted media records
///
/// Records arrive in extraction order and are never revisited.
pub trait OutputSink {
    /// Appends one record
    fn write_record(&mut self, record: &OutputRecord) -> OutputResult<()>;

    /// Pushes buffered records to their destination
    fn flush(&mut self) -> OutputResult<()>;
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn write_record(&mut self, record: &OutputRecord) -> OutputResult<()> {
        (**self).write_record(record)
    }

    fn flush(&mut self) -> OutputResult<()> {
        (**self).flush()
    }
}

impl OutputSink for Vec<OutputRecord> {
    fn write_record(&mut self, record: &OutputRecord) -> OutputResult<()> {
        self.push(record.clone());
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        Ok(())
    }
}
