//! Run summary
//!
//! Counts kept by the coordinator while it works through the code list, and
//! the end-of-run report printed by the CLI.

use crate::period::Period;
use crate::record::TickerRecord;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every code was processed
    Completed,

    /// The stop flag was raised between tickers
    Stopped,

    /// The initial login failed; no ticker was processed
    LoginFailed,

    /// The session expired and logging in again failed
    SessionLost,
}

impl RunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Stopped => "stopped",
            Self::LoginFailed => "login failed",
            Self::SessionLost => "session lost",
        }
    }

    /// Returns true if the run ended because of an error
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::LoginFailed | Self::SessionLost)
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Summary statistics for one run
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub period: Period,

    /// Codes in the input list
    pub total: usize,

    /// Records with both figures
    pub succeeded: usize,

    /// Tickers whose search, filter or content wait failed
    pub degraded: usize,

    /// Records with at least one figure missing that were not degraded
    pub partial: usize,

    /// Records the sink failed to store
    pub write_failures: usize,

    pub outcome: RunOutcome,
    pub output_path: Option<PathBuf>,
    pub elapsed: Duration,
}

impl CrawlSummary {
    pub fn new(period: Period, total: usize) -> Self {
        Self {
            period,
            total,
            succeeded: 0,
            degraded: 0,
            partial: 0,
            write_failures: 0,
            outcome: RunOutcome::Completed,
            output_path: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Counts one emitted record
    pub fn count(&mut self, record: &TickerRecord, degraded: bool) {
        if degraded {
            self.degraded += 1;
        } else if record.has_financials() {
            self.succeeded += 1;
        } else {
            self.partial += 1;
        }
    }

    /// Number of tickers a record was emitted for
    pub fn processed(&self) -> usize {
        self.succeeded + self.degraded + self.partial
    }

    /// Returns the success rate as a percentage of processed tickers
    pub fn success_rate(&self) -> f64 {
        let processed = self.processed();
        if processed == 0 {
            return 0.0;
        }
        (self.succeeded as f64 / processed as f64) * 100.0
    }
}

/// Prints the summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Period: {} ({})", summary.period, summary.period.code());
    println!("Outcome: {}", summary.outcome);
    if let Some(path) = &summary.output_path {
        println!("Output: {}", path.display());
    }
    println!("Elapsed: {:.1}s", summary.elapsed.as_secs_f64());
    println!();

    println!("Tickers:");
    println!("  Requested: {}", summary.total);
    println!("  Processed: {}", summary.processed());
    println!("  Complete: {}", summary.succeeded);
    println!("  Partial: {}", summary.partial);
    println!("  Failed: {}", summary.degraded);
    if summary.write_failures > 0 {
        println!("  Not written: {}", summary.write_failures);
    }
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} tickers with both figures)",
        summary.success_rate(),
        summary.succeeded,
        summary.processed()
    );
}
