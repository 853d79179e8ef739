/// What the crawler knows about the browser session
///
/// Owned by the browser session handle, which the coordinator owns
/// exclusively. Navigation updates `current_page`; only the login flow sets
/// `authenticated`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Whether the last login attempt succeeded and has not since expired
    pub authenticated: bool,

    /// URL of the page last navigated to or observed
    pub current_page: Option<String>,

    /// Number of successful logins in this session
    pub logins: u32,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a page load or an observed redirect
    pub fn visit(&mut self, url: impl Into<String>) {
        self.current_page = Some(url.into());
    }

    /// Records a successful login
    pub fn mark_authenticated(&mut self) {
        self.authenticated = true;
        self.logins += 1;
    }

    /// Records that the server bounced the session back to the login page
    pub fn mark_expired(&mut self) {
        self.authenticated = false;
    }
}
