/// Crawl session state definitions
///
/// This module defines the states the coordinator moves through during a run
/// and which transitions between them are legal.
use std::fmt;

/// Represents the current state of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    // ===== Run States =====
    /// Browser launched, not logged in yet
    Init,

    /// Logged in and on the search page
    Authenticated,

    // ===== Per-Ticker States =====
    /// Typing the ticker into the search box
    Searching,

    /// Selecting period type and period
    Filtering,

    /// Waiting for the result page to render
    Waiting,

    /// Parsing figures out of the rendered page
    Extracting,

    /// The ticker's record has been handed to the sink
    Recorded,

    // ===== Terminal State =====
    /// Run finished, stopped, or aborted
    Done,
}

impl CrawlState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true while a single ticker is being processed
    pub fn is_per_ticker(&self) -> bool {
        matches!(
            self,
            Self::Searching | Self::Filtering | Self::Waiting | Self::Extracting
        )
    }

    /// Returns true if the coordinator may move from `self` to `next`
    ///
    /// Every per-ticker state may fall through to `Recorded`, which is how a
    /// failed ticker is recorded without aborting the batch.
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        use CrawlState::*;

        matches!(
            (self, next),
            (Init, Authenticated)
                | (Init, Done)
                | (Authenticated, Searching)
                | (Authenticated, Done)
                | (Searching, Filtering)
                | (Searching, Recorded)
                | (Filtering, Waiting)
                | (Filtering, Recorded)
                | (Waiting, Extracting)
                | (Waiting, Recorded)
                | (Extracting, Recorded)
                | (Recorded, Searching)
                | (Recorded, Authenticated)
                | (Recorded, Done)
        )
    }

    /// Returns a short lowercase name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Authenticated => "authenticated",
            Self::Searching => "searching",
            Self::Filtering => "filtering",
            Self::Waiting => "waiting",
            Self::Extracting => "extracting",
            Self::Recorded => "recorded",
            Self::Done => "done",
        }
    }

    /// Returns all possible crawl states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Init,
            Self::Authenticated,
            Self::Searching,
            Self::Filtering,
            Self::Waiting,
            Self::Extracting,
            Self::Recorded,
            Self::Done,
        ]
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
