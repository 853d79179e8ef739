//! Output module for persisting records and reporting runs
//!
//! This module handles:
//! - The `RecordSink` interface records are written through
//! - The CSV result file and its naming scheme
//! - The end-of-run summary

mod csv_sink;
pub mod stats;
mod traits;

pub use csv_sink::{output_file_name, CsvSink};
pub use stats::{print_summary, CrawlSummary, RunOutcome};
pub use traits::{OutputError, OutputResult, RecordSink};
