//! The browser session handle used by every crawl flow
//!
//! Wraps a [`WebDriver`] with the timing configuration and the session state,
//! and turns driver failures into the two signals the flows work with: a
//! `false` from navigation and an absent element from waits.

use crate::browser::driver::{Locator, PageElement, WebDriver};
use crate::browser::gate::StepGate;
use crate::config::{SiteConfig, TimingConfig};
use crate::state::SessionState;
use std::time::Duration;

/// Exclusive handle on one browser session
pub struct BrowserSession<D: WebDriver> {
    driver: D,
    timing: TimingConfig,
    gate: StepGate,
    state: SessionState,
}

impl<D: WebDriver> BrowserSession<D> {
    pub fn new(driver: D, timing: TimingConfig, gate: StepGate) -> Self {
        Self {
            driver,
            timing,
            gate,
            state: SessionState::new(),
        }
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    /// Loads a URL, then waits the inter-request delay
    ///
    /// Returns false on any driver error. Errors are logged, never raised.
    pub async fn navigate(&mut self, url: &str) -> bool {
        match self.driver.goto(url).await {
            Ok(()) => {
                self.state.visit(url);
                self.settle(self.timing.request_delay).await;
                true
            }
            Err(e) => {
                tracing::error!("Failed to load {}: {}", url, e);
                false
            }
        }
    }

    /// Waits for an element, up to `timeout` or the configured element timeout
    ///
    /// Returns None when the element never appeared or the driver failed;
    /// either way a warning is logged.
    pub async fn wait_for_element(
        &mut self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> Option<D::Element> {
        let timeout = timeout.unwrap_or(self.timing.element_timeout);
        match self.driver.wait_for(locator, timeout).await {
            Ok(Some(element)) => Some(element),
            Ok(None) => {
                tracing::warn!("Timed out after {:?} waiting for {}", timeout, locator);
                None
            }
            Err(e) => {
                tracing::warn!("Lookup of {} failed: {}", locator, e);
                None
            }
        }
    }

    /// Returns the browser's current URL and records it as the current page
    pub async fn current_url(&mut self) -> Option<String> {
        match self.driver.current_url().await {
            Ok(url) => {
                self.state.visit(url.clone());
                Some(url)
            }
            Err(e) => {
                tracing::warn!("Could not read current URL: {}", e);
                None
            }
        }
    }

    /// Returns true if the browser currently shows the login page
    pub async fn on_login_page(&mut self, site: &SiteConfig) -> bool {
        match self.current_url().await {
            Some(url) => site.is_login_page(&url),
            None => false,
        }
    }

    /// Returns the rendered markup of the current page
    pub async fn page_source(&mut self) -> Option<String> {
        match self.driver.page_source().await {
            Ok(source) => Some(source),
            Err(e) => {
                tracing::warn!("Could not read page source: {}", e);
                None
            }
        }
    }

    /// Reads `attribute` from every element matching the locator
    pub async fn collect_attr(&mut self, locator: &Locator, attribute: &str) -> Vec<String> {
        let elements = match self.driver.find_all(locator).await {
            Ok(elements) => elements,
            Err(e) => {
                tracing::warn!("Lookup of {} failed: {}", locator, e);
                return Vec::new();
            }
        };

        let mut values = Vec::with_capacity(elements.len());
        for element in &elements {
            if let Ok(Some(value)) = element.attr(attribute).await {
                values.push(value);
            }
        }
        values
    }

    /// Sleeps for a fixed settle delay
    pub async fn settle(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Debug step gate; pauses for the operator when enabled
    pub async fn checkpoint(&self, step: &str, level: u8) {
        self.gate.checkpoint(step, level).await;
    }

    /// Ends the WebDriver session and terminates the browser
    pub async fn close(mut self) {
        match self.driver.quit().await {
            Ok(()) => tracing::info!("Browser session closed"),
            Err(e) => tracing::warn!("Browser did not shut down cleanly: {}", e),
        }
    }
}
