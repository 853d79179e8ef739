//! CSV result file

use crate::output::traits::{OutputResult, RecordSink};
use crate::period::Period;
use crate::record::{TickerRecord, COLUMNS};
use chrono::NaiveDate;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Builds the result file path: `{data_dir}/{YYYYMMDD}_{suffix}.csv`
///
/// The suffix is the period code for quarterly runs and `year` for annual ones.
pub fn output_file_name(data_dir: &Path, period: &Period, date: NaiveDate) -> PathBuf {
    data_dir.join(format!(
        "{}_{}.csv",
        date.format("%Y%m%d"),
        period.file_suffix()
    ))
}

/// Writes records to a CSV file, flushing after every row
pub struct CsvSink {
    writer: csv::Writer<File>,
    path: PathBuf,
    rows: usize,
}

impl CsvSink {
    /// Creates (or truncates) the file and writes the header row
    ///
    /// Missing parent directories are created.
    pub fn create(path: impl AsRef<Path>) -> OutputResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(COLUMNS)?;
        writer.flush()?;

        tracing::info!("Writing results to {}", path.display());
        Ok(Self {
            writer,
            path,
            rows: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for CsvSink {
    fn write_record(&mut self, record: &TickerRecord) -> OutputResult<()> {
        self.writer.serialize(record)?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    fn written(&self) -> usize {
        self.rows
    }
}
