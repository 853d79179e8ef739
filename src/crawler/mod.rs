//! Crawler module driving the site flows
//!
//! This module contains the harvesting logic, including:
//! - The login flow
//! - Ticker search and period filtering
//! - Extraction of the figures from the result page
//! - Overall run coordination

mod auth;
mod coordinator;
mod extract;
mod search;

pub use auth::Authenticator;
pub use coordinator::{run_crawl, run_with_driver, Coordinator, StopFlag};
pub use extract::{extract, parse_amount};
pub use search::SearchFlow;
