//! Configuration module for FnGuide-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults matching the live site, so a minimal file only
//! needs credentials (or none at all when they come from the environment).
//!
//! # Example
//!
//! ```no_run
//! use fnguide_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Element timeout: {}s", config.browser.element_timeout_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, Config, Credentials, DebugConfig, ExtractSelectors, LoginSelectors,
    OutputConfig, PeriodConfig, SearchSelectors, SelectorConfig, SiteConfig, TimingConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, PASSWORD_ENV,
    USERNAME_ENV,
};
