//! Driver abstraction over a remote-controlled browser
//!
//! The flows only need a handful of WebDriver commands. Expressing them as a
//! trait keeps the flows independent of the concrete client and lets tests
//! script the browser.

use crate::BrowserResult;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// How to find an element on the page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// CSS selector
    Css(String),

    /// Element id attribute
    Id(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(selector) => write!(f, "css={}", selector),
            Self::Id(id) => write!(f, "id={}", id),
        }
    }
}

/// Special keys, encoded as WebDriver code points so they can be embedded in
/// text sent with [`PageElement::send_keys`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    ArrowDown,
}

impl Key {
    pub fn as_char(&self) -> char {
        match self {
            Self::Enter => '\u{E007}',
            Self::ArrowDown => '\u{E015}',
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// An element handle returned by a [`WebDriver`]
#[async_trait]
pub trait PageElement: Send + Sync {
    /// Clears an input's content
    async fn clear(&self) -> BrowserResult<()>;

    /// Types text into the element; may contain [`Key`] code points
    async fn send_keys(&self, text: &str) -> BrowserResult<()>;

    /// Clicks the element
    async fn click(&self) -> BrowserResult<()>;

    /// Reads an HTML attribute
    async fn attr(&self, name: &str) -> BrowserResult<Option<String>>;

    /// Reads the live `value` property of a form control
    async fn value(&self) -> BrowserResult<Option<String>>;
}

/// The browser commands the crawl flows rely on
#[async_trait]
pub trait WebDriver: Send {
    type Element: PageElement;

    /// Loads a URL in the current window
    async fn goto(&mut self, url: &str) -> BrowserResult<()>;

    /// Returns the URL of the current page
    async fn current_url(&mut self) -> BrowserResult<String>;

    /// Polls for an element until it is present or `timeout` elapses
    ///
    /// Returns `Ok(None)` when the element never appeared.
    async fn wait_for(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> BrowserResult<Option<Self::Element>>;

    /// Returns every element currently matching the locator
    async fn find_all(&mut self, locator: &Locator) -> BrowserResult<Vec<Self::Element>>;

    /// Returns the serialized DOM of the current page
    async fn page_source(&mut self) -> BrowserResult<String>;

    /// Ends the session and terminates the browser
    async fn quit(&mut self) -> BrowserResult<()>;
}
