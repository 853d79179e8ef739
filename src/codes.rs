//! Ticker code list loading
//!
//! The input is a plain text file with one stock code per line.

use crate::HarvestError;
use std::path::Path;

/// Reads stock codes from a newline-delimited file
///
/// Lines are trimmed and blank lines ignored. Lines that are not a six
/// character alphanumeric code are skipped with a warning.
pub fn read_stock_codes(path: &Path) -> Result<Vec<String>, HarvestError> {
    let content = std::fs::read_to_string(path).map_err(|source| HarvestError::CodesFile {
        path: path.display().to_string(),
        source,
    })?;

    let codes = parse_stock_codes(&content);
    tracing::info!("Read {} stock codes from {}", codes.len(), path.display());
    Ok(codes)
}

/// Parses stock codes from file content
pub fn parse_stock_codes(content: &str) -> Vec<String> {
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let code = line.trim();
            if code.is_empty() {
                return None;
            }
            if !is_valid_code(code) {
                tracing::warn!("Skipping line {}: '{}' is not a stock code", idx + 1, code);
                return None;
            }
            Some(code.to_string())
        })
        .collect()
}

/// Returns true if the string looks like a listed-company code
pub fn is_valid_code(code: &str) -> bool {
    code.len() == 6 && code.chars().all(|c| c.is_ascii_alphanumeric())
}
