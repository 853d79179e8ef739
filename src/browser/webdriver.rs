//! [`WebDriver`] implementation backed by `fantoccini`

use crate::browser::driver::{Locator, PageElement, WebDriver};
use crate::config::BrowserConfig;
use crate::{BrowserError, BrowserResult};
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::time::Duration;

/// A live WebDriver session (typically chromedriver)
pub struct FantocciniDriver {
    client: Client,
}

impl FantocciniDriver {
    /// Starts a browser session on the configured WebDriver endpoint
    ///
    /// # Arguments
    ///
    /// * `config` - WebDriver URL and headless flag
    ///
    /// # Returns
    ///
    /// * `Ok(FantocciniDriver)` - Browser launched and session established
    /// * `Err(BrowserError)` - The endpoint refused or could not start a session
    pub async fn connect(config: &BrowserConfig) -> BrowserResult<Self> {
        let mut args = vec!["--no-sandbox", "--disable-dev-shm-usage"];
        if config.headless {
            args.push("--headless=new");
        }

        let mut capabilities = serde_json::Map::new();
        capabilities.insert("goog:chromeOptions".to_string(), json!({ "args": args }));

        tracing::debug!(
            "Connecting to WebDriver at {} (headless: {})",
            config.webdriver_url,
            config.headless
        );

        let client = ClientBuilder::native()
            .capabilities(capabilities)
            .connect(&config.webdriver_url)
            .await
            .map_err(|e| BrowserError::Connect {
                url: config.webdriver_url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self { client })
    }
}

fn to_locator(locator: &Locator) -> fantoccini::Locator<'_> {
    match locator {
        Locator::Css(selector) => fantoccini::Locator::Css(selector),
        Locator::Id(id) => fantoccini::Locator::Id(id),
    }
}

fn command_error(e: CmdError) -> BrowserError {
    BrowserError::Command(e.to_string())
}

/// Element handle within a [`FantocciniDriver`] session
pub struct FantocciniElement(Element);

#[async_trait]
impl PageElement for FantocciniElement {
    async fn clear(&self) -> BrowserResult<()> {
        self.0.clear().await.map_err(command_error)
    }

    async fn send_keys(&self, text: &str) -> BrowserResult<()> {
        self.0.send_keys(text).await.map_err(command_error)
    }

    async fn click(&self) -> BrowserResult<()> {
        self.0.click().await.map_err(command_error)
    }

    async fn attr(&self, name: &str) -> BrowserResult<Option<String>> {
        self.0.attr(name).await.map_err(command_error)
    }

    async fn value(&self) -> BrowserResult<Option<String>> {
        self.0.prop("value").await.map_err(command_error)
    }
}

#[async_trait]
impl WebDriver for FantocciniDriver {
    type Element = FantocciniElement;

    async fn goto(&mut self, url: &str) -> BrowserResult<()> {
        self.client.goto(url).await.map_err(command_error)
    }

    async fn current_url(&mut self) -> BrowserResult<String> {
        let url = self.client.current_url().await.map_err(command_error)?;
        Ok(url.to_string())
    }

    async fn wait_for(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> BrowserResult<Option<Self::Element>> {
        let found = self
            .client
            .wait()
            .at_most(timeout)
            .for_element(to_locator(locator))
            .await;

        match found {
            Ok(element) => Ok(Some(FantocciniElement(element))),
            Err(CmdError::WaitTimeout) => Ok(None),
            Err(e) if e.is_no_such_element() => Ok(None),
            Err(e) => Err(command_error(e)),
        }
    }

    async fn find_all(&mut self, locator: &Locator) -> BrowserResult<Vec<Self::Element>> {
        let elements = self
            .client
            .find_all(to_locator(locator))
            .await
            .map_err(command_error)?;
        Ok(elements.into_iter().map(FantocciniElement).collect())
    }

    async fn page_source(&mut self) -> BrowserResult<String> {
        self.client.source().await.map_err(command_error)
    }

    async fn quit(&mut self) -> BrowserResult<()> {
        self.client.clone().close().await.map_err(command_error)
    }
}
