//! FnGuide-Harvest: a browser-driven financial metrics collector
//!
//! This crate drives a WebDriver-controlled browser through the FnGuide login,
//! ticker search and period filter screens, extracts revenue and operating
//! profit for each stock code, and appends the results to a CSV file.

pub mod browser;
pub mod codes;
pub mod config;
pub mod crawler;
pub mod output;
pub mod period;
pub mod record;
pub mod state;

use thiserror::Error;

/// Main error type for FnGuide-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Period error: {0}")]
    Period(#[from] period::PeriodError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },

    #[error("Failed to read stock codes from {path}: {source}")]
    CodesFile {
        path: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid period in config: {0}")]
    Period(#[from] period::PeriodError),
}

/// Errors raised by the WebDriver layer
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to start WebDriver session at {url}: {message}")]
    Connect { url: String, message: String },

    #[error("WebDriver command failed: {0}")]
    Command(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single UI flow step failed
///
/// Flows below the coordinator recover into this type instead of aborting;
/// only the coordinator decides whether a failure ends the run.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("{element} not found ({locator})")]
    ElementNotFound { element: String, locator: String },

    #[error("Navigation to {url} failed")]
    Navigation { url: String },

    #[error("Login rejected, still on {url}")]
    AuthenticationRejected { url: String },

    #[error("Period option {code} not offered (available: {available:?})")]
    PeriodUnavailable { code: String, available: Vec<String> },

    #[error(transparent)]
    Browser(#[from] BrowserError),
}

impl StepError {
    pub(crate) fn not_found(element: &str, locator: &browser::Locator) -> Self {
        Self::ElementNotFound {
            element: element.to_string(),
            locator: locator.to_string(),
        }
    }
}

/// Result type alias for FnGuide-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for WebDriver operations
pub type BrowserResult<T> = std::result::Result<T, BrowserError>;

/// Result type alias for UI flow steps
pub type StepResult<T> = std::result::Result<T, StepError>;

// Re-export commonly used types
pub use config::Config;
pub use period::{Period, Quarter};
pub use record::TickerRecord;
pub use state::{CrawlState, SessionState};
