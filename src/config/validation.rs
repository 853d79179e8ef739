use crate::config::types::{
    BrowserConfig, Config, Credentials, ExtractSelectors, LoginSelectors, SearchSelectors,
    SiteConfig,
};
use crate::period::Period;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_browser_config(&config.browser)?;
    validate_site_config(&config.site)?;
    validate_credentials(&config.credentials)?;
    validate_login_selectors(&config.selectors.login)?;
    validate_search_selectors(&config.selectors.search)?;
    validate_extract_selectors(&config.selectors.extract)?;
    validate_output_config(&config.output)?;
    if let Some(period) = &config.period {
        Period::from_parts(period.year, period.quarter)?;
    }
    Ok(())
}

/// Validates WebDriver settings and timings
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    validate_http_url("webdriver-url", &config.webdriver_url)?;

    if config.element_timeout_secs < 1 || config.element_timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "element-timeout-secs must be between 1 and 300, got {}",
            config.element_timeout_secs
        )));
    }

    Ok(())
}

/// Validates the site URLs
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_http_url("login-url", &config.login_url)?;
    validate_http_url("item-detail-url", &config.item_detail_url)?;

    if config.login_url == config.item_detail_url {
        return Err(ConfigError::Validation(
            "login-url and item-detail-url must differ".to_string(),
        ));
    }

    Ok(())
}

/// Validates that credentials were supplied by the file or the environment
fn validate_credentials(credentials: &Credentials) -> Result<(), ConfigError> {
    if credentials.username.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "username is empty; set [credentials] username or {}",
            crate::config::USERNAME_ENV
        )));
    }

    if credentials.password.is_empty() {
        return Err(ConfigError::Validation(format!(
            "password is empty; set [credentials] password or {}",
            crate::config::PASSWORD_ENV
        )));
    }

    Ok(())
}

fn validate_login_selectors(selectors: &LoginSelectors) -> Result<(), ConfigError> {
    require_selector("selectors.login.id-field", &selectors.id_field)?;
    require_selector("selectors.login.pw-field", &selectors.pw_field)?;
    require_selector("selectors.login.submit-button", &selectors.submit_button)
}

fn validate_search_selectors(selectors: &SearchSelectors) -> Result<(), ConfigError> {
    require_selector("selectors.search.search-input-id", &selectors.search_input_id)?;
    require_selector(
        "selectors.search.period-type-dropdown",
        &selectors.period_type_dropdown,
    )?;
    require_selector("selectors.search.annual-option", &selectors.annual_option)?;
    require_selector("selectors.search.quarterly-option", &selectors.quarterly_option)?;
    require_selector("selectors.search.period-dropdown", &selectors.period_dropdown)?;
    require_selector("selectors.search.period-options", &selectors.period_options)?;
    require_selector("selectors.search.submit-button", &selectors.submit_button)?;
    require_selector("selectors.search.dismiss-target", &selectors.dismiss_target)?;

    // The id is used verbatim as an element id, not parsed as CSS
    if selectors.search_input_id.starts_with('#') {
        return Err(ConfigError::Validation(format!(
            "selectors.search.search-input-id must be a bare element id, got '{}'",
            selectors.search_input_id
        )));
    }

    let placeholders = selectors.period_option_template.matches("{}").count();
    if placeholders != 1 {
        return Err(ConfigError::Validation(format!(
            "selectors.search.period-option-template must contain exactly one '{{}}', got '{}'",
            selectors.period_option_template
        )));
    }

    Ok(())
}

fn validate_extract_selectors(selectors: &ExtractSelectors) -> Result<(), ConfigError> {
    for (name, selector) in [
        ("selectors.extract.sales-cell", &selectors.sales_cell),
        (
            "selectors.extract.operating-profit-cell",
            &selectors.operating_profit_cell,
        ),
    ] {
        require_selector(name, selector)?;
        scraper::Selector::parse(selector).map_err(|e| {
            ConfigError::Validation(format!("{} is not valid CSS: {:?}", name, e))
        })?;
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if config.data_dir.is_empty() {
        return Err(ConfigError::Validation("data-dir cannot be empty".to_string()));
    }

    if config.log_dir.is_empty() {
        return Err(ConfigError::Validation("log-dir cannot be empty".to_string()));
    }

    Ok(())
}

fn require_selector(name: &str, selector: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }
    Ok(())
}

/// Validates that a URL is absolute and uses http or https
fn validate_http_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url =
        Url::parse(value).map_err(|e| ConfigError::InvalidUrl(format!("{} '{}': {}", name, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            name, value
        )));
    }

    Ok(())
}
