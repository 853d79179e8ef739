//! Operator step-through for watching a crawl against the live site

use crate::config::DebugConfig;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;

/// Step level of the login form interactions
pub const LOGIN_STEP: u8 = 1;

/// Step level of the per-ticker search, filter and extraction interactions
pub const TICKER_STEP: u8 = 2;

/// Pauses before UI steps until the operator presses Enter
///
/// A step pauses when the gate is enabled and its level is at or above
/// `skip_step`, so `skip_step = 2` steps through tickers but not login.
/// Stdin is opened on the first pause and kept for the rest of the run.
#[derive(Debug, Default)]
pub struct StepGate {
    enabled: bool,
    skip_step: u8,
    stdin: Mutex<Option<BufReader<Stdin>>>,
}

impl StepGate {
    pub fn new(config: &DebugConfig) -> Self {
        Self {
            enabled: config.enabled,
            skip_step: config.skip_step,
            stdin: Mutex::new(None),
        }
    }

    /// A gate that never pauses
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn should_pause(&self, level: u8) -> bool {
        self.enabled && self.skip_step <= level
    }

    /// Blocks on stdin before `step` if the gate applies to `level`
    pub async fn checkpoint(&self, step: &str, level: u8) {
        if !self.should_pause(level) {
            return;
        }

        let mut stdin = self.stdin.lock().await;
        let reader = stdin.get_or_insert_with(|| BufReader::new(tokio::io::stdin()));
        wait_for_enter(reader, step).await;
    }
}

/// Prompts for `step` and consumes one line from `reader`
async fn wait_for_enter<R: AsyncBufRead + Unpin>(reader: &mut R, step: &str) {
    tracing::info!("[debug] '{}' ready", step);
    print!("[debug] '{}' ready. Press Enter to continue...", step);
    if let Err(e) = std::io::stdout().flush() {
        tracing::warn!("Could not flush debug prompt: {}", e);
    }

    let mut line = String::new();
    if let Err(e) = reader.read_line(&mut line).await {
        tracing::warn!("Could not read debug confirmation: {}", e);
    }
}
