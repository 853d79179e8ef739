//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: the coordinator's state machine (login, per-ticker steps, done)
//! - `SessionState`: what is known about the browser session (login, current page)

mod crawl_state;
mod session_state;

// Re-export main types
pub use crawl_state::CrawlState;
pub use session_state::SessionState;
