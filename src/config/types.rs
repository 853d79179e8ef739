use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Main configuration structure for FnGuide-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub debug: DebugConfig,
    pub period: Option<PeriodConfig>,
}

/// WebDriver connection and timing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// WebDriver endpoint (e.g. a local chromedriver)
    #[serde(rename = "webdriver-url")]
    pub webdriver_url: String,

    /// Run the browser without a visible window
    pub headless: bool,

    /// Upper bound for any element-presence wait (seconds)
    #[serde(rename = "element-timeout-secs")]
    pub element_timeout_secs: u64,

    /// Pause after each navigation and query submit (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Pause after clicking the login button, before checking the redirect
    #[serde(rename = "login-settle-ms")]
    pub login_settle_ms: u64,

    /// Pause after typing a ticker, before picking the first suggestion
    #[serde(rename = "autocomplete-settle-ms")]
    pub autocomplete_settle_ms: u64,

    /// Pause after moving to the first suggestion, before submitting
    #[serde(rename = "suggestion-settle-ms")]
    pub suggestion_settle_ms: u64,

    /// Pause after each dropdown click
    #[serde(rename = "dropdown-settle-ms")]
    pub dropdown_settle_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            element_timeout_secs: 30,
            request_delay_ms: 2000,
            login_settle_ms: 5000,
            autocomplete_settle_ms: 1500,
            suggestion_settle_ms: 500,
            dropdown_settle_ms: 1000,
        }
    }
}

impl BrowserConfig {
    /// Collects the timing knobs into the form the session and flows use
    pub fn timing(&self) -> TimingConfig {
        TimingConfig {
            element_timeout: Duration::from_secs(self.element_timeout_secs),
            request_delay: Duration::from_millis(self.request_delay_ms),
            login_settle: Duration::from_millis(self.login_settle_ms),
            autocomplete_settle: Duration::from_millis(self.autocomplete_settle_ms),
            suggestion_settle: Duration::from_millis(self.suggestion_settle_ms),
            dropdown_settle: Duration::from_millis(self.dropdown_settle_ms),
        }
    }
}

/// Fixed waits and timeouts used while driving the site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    pub element_timeout: Duration,
    pub request_delay: Duration,
    pub login_settle: Duration,
    pub autocomplete_settle: Duration,
    pub suggestion_settle: Duration,
    pub dropdown_settle: Duration,
}

impl TimingConfig {
    /// All waits zero, element timeout one millisecond
    pub fn immediate() -> Self {
        Self {
            element_timeout: Duration::from_millis(1),
            request_delay: Duration::ZERO,
            login_settle: Duration::ZERO,
            autocomplete_settle: Duration::ZERO,
            suggestion_settle: Duration::ZERO,
            dropdown_settle: Duration::ZERO,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        BrowserConfig::default().timing()
    }
}

/// Target site locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Login form page; landing here mid-run means the session expired
    #[serde(rename = "login-url")]
    pub login_url: String,

    /// Item detail page hosting the ticker search and period filters
    #[serde(rename = "item-detail-url")]
    pub item_detail_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            login_url: "https://www.fnguide.com/home/login".to_string(),
            item_detail_url: "https://www.fnguide.com/Fgdc/ItemDetail".to_string(),
        }
    }
}

impl SiteConfig {
    /// Returns true if `url` points at the login page
    ///
    /// Host and path are compared; query string, fragment, trailing slash and
    /// path case are ignored so redirects like `/home/login?returnUrl=..` match.
    pub fn is_login_page(&self, url: &str) -> bool {
        let (Ok(current), Ok(login)) = (url::Url::parse(url), url::Url::parse(&self.login_url))
        else {
            return url.trim_end_matches('/') == self.login_url.trim_end_matches('/');
        };

        current.host_str() == login.host_str()
            && current
                .path()
                .trim_end_matches('/')
                .eq_ignore_ascii_case(login.path().trim_end_matches('/'))
    }
}

/// Login credentials
///
/// When left empty in the file, `FNGUIDE_USERNAME` and `FNGUIDE_PASSWORD`
/// are read from the environment.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Element locators, grouped by the flow that uses them
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub login: LoginSelectors,
    pub search: SearchSelectors,
    pub extract: ExtractSelectors,
}

/// CSS selectors of the login form
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoginSelectors {
    #[serde(rename = "id-field")]
    pub id_field: String,

    #[serde(rename = "pw-field")]
    pub pw_field: String,

    #[serde(rename = "submit-button")]
    pub submit_button: String,
}

impl Default for LoginSelectors {
    fn default() -> Self {
        Self {
            id_field: "#txtID".to_string(),
            pw_field: "#txtPW".to_string(),
            submit_button: "#divLogin > div.lay--popFooter > form > button.btn--back".to_string(),
        }
    }
}

/// Locators of the ticker search box and period filter controls
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSelectors {
    /// Element id (not a CSS selector) of the ticker search input
    #[serde(rename = "search-input-id")]
    pub search_input_id: String,

    #[serde(rename = "period-type-dropdown")]
    pub period_type_dropdown: String,

    #[serde(rename = "annual-option")]
    pub annual_option: String,

    #[serde(rename = "quarterly-option")]
    pub quarterly_option: String,

    #[serde(rename = "period-dropdown")]
    pub period_dropdown: String,

    /// Option selector with a single `{}` placeholder for the period code
    #[serde(rename = "period-option-template")]
    pub period_option_template: String,

    /// Matches every option of the period dropdown, for diagnostics
    #[serde(rename = "period-options")]
    pub period_options: String,

    #[serde(rename = "submit-button")]
    pub submit_button: String,

    /// Element clicked to force an open dropdown closed
    #[serde(rename = "dismiss-target")]
    pub dismiss_target: String,
}

impl Default for SearchSelectors {
    fn default() -> Self {
        Self {
            search_input_id: "txtSearchWd".to_string(),
            period_type_dropdown: "#selAccType".to_string(),
            annual_option: "#selAccType > option[value='Y']".to_string(),
            quarterly_option: "#selAccType > option[value='Q']".to_string(),
            period_dropdown: "#selTerm".to_string(),
            period_option_template: "#selTerm > option[value='{}']".to_string(),
            period_options: "#selTerm > option".to_string(),
            submit_button: "#btnSearch".to_string(),
            dismiss_target: "body".to_string(),
        }
    }
}

impl SearchSelectors {
    /// Builds the selector of the period option carrying `code`
    pub fn period_option(&self, code: &str) -> String {
        self.period_option_template.replacen("{}", code, 1)
    }
}

/// Positional selectors of the figures in the result table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractSelectors {
    #[serde(rename = "sales-cell")]
    pub sales_cell: String,

    #[serde(rename = "operating-profit-cell")]
    pub operating_profit_cell: String,
}

impl Default for ExtractSelectors {
    fn default() -> Self {
        Self {
            sales_cell: "#contents > table > tbody > tr:nth-child(4) > td:nth-child(2)"
                .to_string(),
            operating_profit_cell:
                "#contents > table > tbody > tr:nth-child(4) > td:nth-child(3)".to_string(),
        }
    }
}

/// Input and output locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the result CSV files
    #[serde(rename = "data-dir")]
    pub data_dir: String,

    /// Directory receiving log files
    #[serde(rename = "log-dir")]
    pub log_dir: String,

    /// Default stock code list
    #[serde(rename = "codes-path")]
    pub codes_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            log_dir: "logs".to_string(),
            codes_path: "code.txt".to_string(),
        }
    }
}

/// Operator step-through mode
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Pause before each UI step until Enter is pressed
    pub enabled: bool,

    /// Steps below this level run without pausing
    #[serde(rename = "skip-step")]
    pub skip_step: u8,
}

/// Default period, used when none is given on the command line
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PeriodConfig {
    pub year: i32,

    /// Absent for annual figures
    pub quarter: Option<u8>,
}
