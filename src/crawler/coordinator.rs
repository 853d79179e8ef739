//! Crawler coordinator - main harvest orchestration logic
//!
//! This module contains the loop that works through the stock code list:
//! - Logging in, and logging in again when the session expires
//! - Running search, filter, content wait and extraction per ticker
//! - Turning per-ticker failures into unresolved records
//! - Handing every record to the sink as soon as it exists
//! - Stopping between tickers on request

use crate::browser::{BrowserSession, FantocciniDriver, PageElement, StepGate, WebDriver};
use crate::config::{Config, TimingConfig};
use crate::crawler::auth::Authenticator;
use crate::crawler::extract::extract;
use crate::crawler::search::SearchFlow;
use crate::output::{output_file_name, CrawlSummary, CsvSink, RecordSink, RunOutcome};
use crate::period::Period;
use crate::record::TickerRecord;
use crate::state::CrawlState;
use crate::HarvestError;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Cooperative cancellation, checked between tickers
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the run to stop before the next ticker
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<D: WebDriver, S: RecordSink> {
    session: BrowserSession<D>,
    sink: S,
    config: Arc<Config>,
    period: Period,
    state: CrawlState,
    stop: StopFlag,
}

impl<D: WebDriver, S: RecordSink> Coordinator<D, S> {
    pub fn new(
        session: BrowserSession<D>,
        sink: S,
        config: Arc<Config>,
        period: Period,
        stop: StopFlag,
    ) -> Self {
        Self {
            session,
            sink,
            config,
            period,
            state: CrawlState::Init,
            stop,
        }
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn session(&self) -> &BrowserSession<D> {
        &self.session
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Moves to `next`, rejecting transitions the state machine does not allow
    fn transition(&mut self, next: CrawlState) -> Result<(), HarvestError> {
        if !self.state.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::trace!("{} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Runs the harvest over `codes`, in order
    ///
    /// Ticker-level failures never end the run; they produce an unresolved
    /// record. The run ends early only when the stop flag is raised, the
    /// initial login fails, or a login after session expiry fails. The
    /// outcome is reported in the summary.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - The run ended, for whatever reason
    /// * `Err(HarvestError)` - The coordinator itself misbehaved
    pub async fn run(&mut self, codes: &[String]) -> Result<CrawlSummary, HarvestError> {
        let start_time = Instant::now();
        let config = Arc::clone(&self.config);
        let timing = *self.session.timing();
        let mut summary = CrawlSummary::new(self.period, codes.len());

        tracing::info!(
            "Harvesting {} codes for {} (period code {})",
            codes.len(),
            self.period,
            self.period.code()
        );

        if let Err(e) = self.login(&config, &timing).await {
            tracing::error!("Login failed: {}", e);
            self.transition(CrawlState::Done)?;
            summary.outcome = RunOutcome::LoginFailed;
            summary.elapsed = start_time.elapsed();
            return Ok(summary);
        }
        self.transition(CrawlState::Authenticated)?;

        for (idx, code) in codes.iter().enumerate() {
            if self.stop.is_stopped() {
                tracing::warn!(
                    "Stop requested, {} of {} codes left unprocessed",
                    codes.len() - idx,
                    codes.len()
                );
                summary.outcome = RunOutcome::Stopped;
                break;
            }

            tracing::info!("[{}/{}] {}", idx + 1, codes.len(), code);

            if !self.ensure_session(&config, &timing).await? {
                tracing::error!(
                    "Session lost, aborting with {} codes unprocessed",
                    codes.len() - idx
                );
                summary.outcome = RunOutcome::SessionLost;
                break;
            }

            let (record, degraded) = self.process_ticker(code, &config, &timing).await?;

            match self.sink.write_record(&record) {
                Ok(()) => tracing::debug!("{}: record written", code),
                Err(e) => {
                    tracing::error!("{}: failed to write record: {}", code, e);
                    summary.write_failures += 1;
                }
            }
            summary.count(&record, degraded);
        }

        self.transition(CrawlState::Done)?;
        summary.elapsed = start_time.elapsed();

        tracing::info!(
            "Harvest {}: {} of {} codes processed in {:?}",
            summary.outcome,
            summary.processed(),
            summary.total,
            summary.elapsed
        );

        Ok(summary)
    }

    async fn login(&mut self, config: &Config, timing: &TimingConfig) -> crate::StepResult<()> {
        let auth = Authenticator::new(
            &config.site,
            &config.selectors.login,
            &config.credentials,
            timing,
        );
        auth.login(&mut self.session).await
    }

    /// Reloads the item detail page, logging in again if it redirected
    ///
    /// Returns false when the session expired and could not be restored.
    async fn ensure_session(
        &mut self,
        config: &Config,
        timing: &TimingConfig,
    ) -> Result<bool, HarvestError> {
        if !self.session.navigate(&config.site.item_detail_url).await {
            tracing::warn!("Could not reload {}", config.site.item_detail_url);
        }

        if !self.session.on_login_page(&config.site).await {
            return Ok(true);
        }

        tracing::warn!("Session expired, logging in again");
        self.session.state_mut().mark_expired();
        if self.state != CrawlState::Authenticated {
            self.transition(CrawlState::Authenticated)?;
        }

        match self.login(config, timing).await {
            Ok(()) => Ok(true),
            Err(e) => {
                tracing::error!("Login after session expiry failed: {}", e);
                Ok(false)
            }
        }
    }

    /// Searches, filters, waits for and extracts one ticker
    ///
    /// Returns the record and whether the ticker degraded to an unresolved one.
    async fn process_ticker(
        &mut self,
        code: &str,
        config: &Config,
        timing: &TimingConfig,
    ) -> Result<(TickerRecord, bool), HarvestError> {
        let flow = SearchFlow::new(&config.selectors.search, timing);

        self.transition(CrawlState::Searching)?;
        if let Err(e) = flow.search(&mut self.session, code).await {
            tracing::warn!("{}: search failed: {}", code, e);
            return self.unresolved(code);
        }

        self.transition(CrawlState::Filtering)?;
        if let Err(e) = flow.filter(&mut self.session, &self.period).await {
            tracing::warn!("{}: period filter failed: {}", code, e);
            return self.unresolved(code);
        }

        self.transition(CrawlState::Waiting)?;
        let Some(input) = self
            .session
            .wait_for_element(&flow.search_input(), None)
            .await
        else {
            tracing::warn!("{}: result page did not load", code);
            return self.unresolved(code);
        };
        let display_name = match input.value().await {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("{}: could not read stock name: {}", code, e);
                None
            }
        };

        self.transition(CrawlState::Extracting)?;
        let markup = self.session.page_source().await.unwrap_or_default();
        let record = extract(
            &markup,
            code,
            display_name.as_deref(),
            &config.selectors.extract,
        );
        tracing::info!(
            "{} {}: sales {:?}, operating profit {:?}",
            code,
            record.stock_name.as_deref().unwrap_or("-"),
            record.sales,
            record.operating_profit
        );

        self.transition(CrawlState::Recorded)?;
        Ok((record, false))
    }

    fn unresolved(&mut self, code: &str) -> Result<(TickerRecord, bool), HarvestError> {
        self.transition(CrawlState::Recorded)?;
        Ok((TickerRecord::unresolved(code), true))
    }

    /// Splits the coordinator into its session and sink
    pub fn into_parts(self) -> (BrowserSession<D>, S) {
        (self.session, self.sink)
    }

    /// Terminates the browser
    pub async fn close(self) {
        self.session.close().await;
    }
}

/// Runs a complete harvest against the live site
///
/// Starts a browser session, then hands over to [`run_with_driver`]. No
/// result file is touched when the WebDriver endpoint cannot be reached.
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `period` - Reporting period to collect
/// * `codes` - Stock codes, in output order
/// * `stop` - Raised to stop between tickers
pub async fn run_crawl(
    config: Arc<Config>,
    period: Period,
    codes: &[String],
    stop: StopFlag,
) -> Result<CrawlSummary, HarvestError> {
    let driver = FantocciniDriver::connect(&config.browser).await?;
    tracing::info!("Browser session started");
    run_with_driver(driver, config, period, codes, stop).await
}

/// Runs a harvest on an already connected browser
///
/// Creates the dated result file under the data directory, runs the
/// coordinator and closes the browser whatever the outcome, including when
/// the result file cannot be created.
pub async fn run_with_driver<D: WebDriver>(
    driver: D,
    config: Arc<Config>,
    period: Period,
    codes: &[String],
    stop: StopFlag,
) -> Result<CrawlSummary, HarvestError> {
    let session = BrowserSession::new(
        driver,
        config.browser.timing(),
        StepGate::new(&config.debug),
    );

    let date = chrono::Local::now().date_naive();
    let path = output_file_name(Path::new(&config.output.data_dir), &period, date);
    let sink = match CsvSink::create(&path) {
        Ok(sink) => sink,
        Err(e) => {
            session.close().await;
            return Err(e.into());
        }
    };

    let mut coordinator = Coordinator::new(session, sink, config, period, stop);
    let result = coordinator.run(codes).await;
    coordinator.close().await;

    let mut summary = result?;
    summary.output_path = Some(path);
    Ok(summary)
}
