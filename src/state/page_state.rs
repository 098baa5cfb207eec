/// Page state definitions for tracking crawl outcomes
///
/// This module defines the terminal states a dequeued page can end in.
use std::fmt;

/// Represents the outcome of fetching one page during a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageState {
    // ===== Success States =====
    /// Page was fetched as HTML and its links were considered
    Processed,

    /// Page was fetched but is not HTML, so it was not expanded
    ContentMismatch,

    // ===== Error States =====
    /// Page returned HTTP 404 or 410
    DeadLink,

    /// Page could not be reached (connection refused, DNS failure, timeout)
    Unreachable,

    /// Page fetch failed for other reasons (5xx, redirect limit, body error)
    Failed,
}

impl PageState {
    /// Returns true if the page was retrieved successfully
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed | Self::ContentMismatch)
    }

    /// Returns true if this represents a fetch failure
    pub fn is_error(&self) -> bool {
        matches!(self, Self::DeadLink | Self::Unreachable | Self::Failed)
    }

    /// Short machine-readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::ContentMismatch => "content_mismatch",
            Self::DeadLink => "dead_link",
            Self::Unreachable => "unreachable",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Processed,
            Self::ContentMismatch,
            Self::DeadLink,
            Self::Unreachable,
            Self::Failed,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
