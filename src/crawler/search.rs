//! Ticker search and period filter flow
//!
//! Runs on the item detail page of an authenticated session. Every located
//! element is required: the first one missing ends the flow for that ticker.

use crate::browser::gate::TICKER_STEP;
use crate::browser::{BrowserSession, Key, Locator, PageElement, WebDriver};
use crate::config::{SearchSelectors, TimingConfig};
use crate::period::Period;
use crate::{StepError, StepResult};

/// Drives the ticker search box and the period dropdowns
pub struct SearchFlow<'a> {
    selectors: &'a SearchSelectors,
    timing: &'a TimingConfig,
}

impl<'a> SearchFlow<'a> {
    pub fn new(selectors: &'a SearchSelectors, timing: &'a TimingConfig) -> Self {
        Self { selectors, timing }
    }

    /// Locator of the ticker search input, also the content-ready signal
    pub fn search_input(&self) -> Locator {
        Locator::id(&self.selectors.search_input_id)
    }

    /// Searches a ticker and filters the result to `period`
    pub async fn locate_and_filter<D: WebDriver>(
        &self,
        session: &mut BrowserSession<D>,
        code: &str,
        period: &Period,
    ) -> StepResult<()> {
        self.search(session, code).await?;
        self.filter(session, period).await
    }

    /// Types `code` into the search box and picks the first autocomplete hit
    pub async fn search<D: WebDriver>(
        &self,
        session: &mut BrowserSession<D>,
        code: &str,
    ) -> StepResult<()> {
        let locator = self.search_input();
        let input = session
            .wait_for_element(&locator, None)
            .await
            .ok_or_else(|| StepError::not_found("search input", &locator))?;

        session.checkpoint("enter stock code", TICKER_STEP).await;
        input.clear().await?;
        input.send_keys(code).await?;
        session.settle(self.timing.autocomplete_settle).await;

        session.checkpoint("pick first suggestion", TICKER_STEP).await;
        input.send_keys(&Key::ArrowDown.to_string()).await?;
        session.settle(self.timing.suggestion_settle).await;
        input.send_keys(&Key::Enter.to_string()).await?;
        session.settle(self.timing.request_delay).await;

        tracing::debug!("Searched {}", code);
        Ok(())
    }

    /// Selects the period type and period, then submits the query
    pub async fn filter<D: WebDriver>(
        &self,
        session: &mut BrowserSession<D>,
        period: &Period,
    ) -> StepResult<()> {
        session.checkpoint("select period type", TICKER_STEP).await;
        self.click(session, &self.selectors.period_type_dropdown, "period type dropdown")
            .await?;
        let (option, label) = match period {
            Period::Annual { .. } => (&self.selectors.annual_option, "annual option"),
            Period::Quarterly { .. } => (&self.selectors.quarterly_option, "quarterly option"),
        };
        self.click(session, option, label).await?;
        self.dismiss(session).await?;

        let code = period.code();
        session.checkpoint("select period", TICKER_STEP).await;
        self.click(session, &self.selectors.period_dropdown, "period dropdown")
            .await?;

        let option_locator = Locator::css(self.selectors.period_option(&code));
        let Some(option) = session.wait_for_element(&option_locator, None).await else {
            let available = session
                .collect_attr(&Locator::css(&self.selectors.period_options), "value")
                .await;
            tracing::warn!(
                "Period {} ({}) not offered; available: {:?}",
                period,
                code,
                available
            );
            return Err(StepError::PeriodUnavailable { code, available });
        };
        option.click().await?;
        session.settle(self.timing.dropdown_settle).await;
        self.dismiss(session).await?;

        session.checkpoint("submit query", TICKER_STEP).await;
        self.click(session, &self.selectors.submit_button, "query button")
            .await?;
        session.settle(self.timing.request_delay).await;

        tracing::debug!("Filtered to {} ({})", period, code);
        Ok(())
    }

    /// Clicks the dismiss target so an open dropdown closes
    async fn dismiss<D: WebDriver>(&self, session: &mut BrowserSession<D>) -> StepResult<()> {
        self.click(session, &self.selectors.dismiss_target, "dismiss target")
            .await
    }

    /// Waits for a CSS-located element, clicks it, then waits the dropdown settle
    async fn click<D: WebDriver>(
        &self,
        session: &mut BrowserSession<D>,
        selector: &str,
        element: &str,
    ) -> StepResult<()> {
        let locator = Locator::css(selector);
        let target = session
            .wait_for_element(&locator, None)
            .await
            .ok_or_else(|| StepError::not_found(element, &locator))?;
        target.click().await?;
        session.settle(self.timing.dropdown_settle).await;
        Ok(())
    }
}
