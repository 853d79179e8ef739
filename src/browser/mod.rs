//! Browser module: the remote-controlled browser the crawler drives
//!
//! This module contains:
//! - The `WebDriver` / `PageElement` traits the flows are written against
//! - `FantocciniDriver`, the implementation talking to a real WebDriver
//! - `BrowserSession`, which adds timing, logging and session state
//! - `StepGate`, the operator pause used in debug mode

mod driver;
pub mod gate;
mod session;
mod webdriver;

pub use driver::{Key, Locator, PageElement, WebDriver};
pub use gate::StepGate;
pub use session::BrowserSession;
pub use webdriver::{FantocciniDriver, FantocciniElement};
