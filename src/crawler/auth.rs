//! Login flow
//!
//! Fills the login form, waits for the server-side redirect and confirms the
//! browser left the login page. On success the browser is parked on the item
//! detail page, so callers can assume "logged in" means "on the search page".

use crate::browser::gate::LOGIN_STEP;
use crate::browser::{BrowserSession, Key, Locator, PageElement, WebDriver};
use crate::config::{Credentials, LoginSelectors, SiteConfig, TimingConfig};
use crate::{StepError, StepResult};

/// Drives the login form
pub struct Authenticator<'a> {
    site: &'a SiteConfig,
    selectors: &'a LoginSelectors,
    credentials: &'a Credentials,
    timing: &'a TimingConfig,
}

impl<'a> Authenticator<'a> {
    pub fn new(
        site: &'a SiteConfig,
        selectors: &'a LoginSelectors,
        credentials: &'a Credentials,
        timing: &'a TimingConfig,
    ) -> Self {
        Self {
            site,
            selectors,
            credentials,
            timing,
        }
    }

    /// Logs in and navigates to the item detail page
    ///
    /// # Steps
    ///
    /// 1. Open the login page
    /// 2. Fill the id field
    /// 3. Fill the password field, submitting with an embedded Enter
    /// 4. Click the login button
    /// 5. Wait for the redirect and check we are no longer on the login page
    /// 6. Open the item detail page
    ///
    /// Each missing element short-circuits with `ElementNotFound`.
    pub async fn login<D: WebDriver>(&self, session: &mut BrowserSession<D>) -> StepResult<()> {
        session.checkpoint("open login page", LOGIN_STEP).await;
        if !session.navigate(&self.site.login_url).await {
            return Err(StepError::Navigation {
                url: self.site.login_url.clone(),
            });
        }

        let id_locator = Locator::css(&self.selectors.id_field);
        let id_field = session
            .wait_for_element(&id_locator, None)
            .await
            .ok_or_else(|| StepError::not_found("login id field", &id_locator))?;

        session.checkpoint("enter id", LOGIN_STEP).await;
        id_field.send_keys(&self.credentials.username).await?;

        let pw_locator = Locator::css(&self.selectors.pw_field);
        let pw_field = session
            .wait_for_element(&pw_locator, None)
            .await
            .ok_or_else(|| StepError::not_found("login password field", &pw_locator))?;

        session.checkpoint("enter password", LOGIN_STEP).await;
        pw_field.clear().await?;
        pw_field
            .send_keys(&format!("{}{}", self.credentials.password, Key::Enter))
            .await?;

        let submit_locator = Locator::css(&self.selectors.submit_button);
        let submit = session
            .wait_for_element(&submit_locator, None)
            .await
            .ok_or_else(|| StepError::not_found("login button", &submit_locator))?;

        session.checkpoint("click login button", LOGIN_STEP).await;
        submit.click().await?;

        session.settle(self.timing.login_settle).await;

        // Success requires seeing the browser leave the login page
        let url = match session.current_url().await {
            Some(url) if !self.site.is_login_page(&url) => url,
            Some(url) => {
                session.state_mut().mark_expired();
                return Err(StepError::AuthenticationRejected { url });
            }
            None => {
                session.state_mut().mark_expired();
                return Err(StepError::AuthenticationRejected {
                    url: self.site.login_url.clone(),
                });
            }
        };
        tracing::debug!("Login redirected to {}", url);

        session.state_mut().mark_authenticated();
        tracing::info!("Logged in as {}", self.credentials.username);

        if !session.navigate(&self.site.item_detail_url).await {
            return Err(StepError::Navigation {
                url: self.site.item_detail_url.clone(),
            });
        }

        Ok(())
    }
}
