//! Record sink trait and output errors

use crate::record::TickerRecord;
use thiserror::Error;

/// Errors that can occur while writing results
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination of ticker records
///
/// Records arrive one at a time in processing order. Implementations should
/// make each record durable before returning, so an aborted run keeps every
/// row written so far.
pub trait RecordSink {
    /// Appends one record
    fn write_record(&mut self, record: &TickerRecord) -> OutputResult<()>;

    /// Number of records written so far
    fn written(&self) -> usize;
}

/// Collects records in memory
impl RecordSink for Vec<TickerRecord> {
    fn write_record(&mut self, record: &TickerRecord) -> OutputResult<()> {
        self.push(record.clone());
        Ok(())
    }

    fn written(&self) -> usize {
        self.len()
    }
}
