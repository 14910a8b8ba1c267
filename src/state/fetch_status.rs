/// Fetch status definitions for crawled URLs
///
/// Every URL handed to the fetcher ends in exactly one of these states.
use std::fmt;

/// Outcome classification of a single fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchStatus {
    /// Page was fetched and its signals extracted
    Success,

    /// Page could not be fetched (timeout, HTTP error, network failure)
    Failed,

    /// Server answered 401 or 403; re-running with credentials may help
    AuthRequired,
}

impl FetchStatus {
    /// Returns true if the page is eligible as a matching candidate
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Converts the status to a database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::AuthRequired => "auth_required",
        }
    }

    /// Parses a status from a database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            "auth_required" => Some(Self::AuthRequired),
            _ => None,
        }
    }

    /// Returns all possible statuses
    pub fn all() -> [Self; 3] {
        [Self::Success, Self::Failed, Self::AuthRequired]
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
