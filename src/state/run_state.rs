use crate::crawler::CrawlOutcome;
use crate::matching::MatchRecord;
use crate::state::{ContentSignal, FetchStatus};
use std::fmt;

/// Which of the two URL sets a crawl result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlSide {
    /// URLs on the retired site
    Old,
    /// URLs on the replacement site
    New,
}

impl CrawlSide {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Old => "old",
            Self::New => "new",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "old" => Some(Self::Old),
            "new" => Some(Self::New),
            _ => None,
        }
    }
}

impl fmt::Display for CrawlSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// Everything a single mapping run accumulates
///
/// Owned exclusively by the run driver and passed by `&mut` through the
/// pipeline stages. Call [`RunState::reset`] before reusing it for a new run.
#[derive(Debug, Default)]
pub struct RunState {
    pub crawl_results_old: Vec<ContentSignal>,
    pub crawl_results_new: Vec<ContentSignal>,
    pub matches: Vec<MatchRecord>,
    pub auth_required_urls: Vec<String>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all results left over from a previous run
    pub fn reset(&mut self) {
        self.crawl_results_old.clear();
        self.crawl_results_new.clear();
        self.matches.clear();
        self.auth_required_urls.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.crawl_results_old.is_empty()
            && self.crawl_results_new.is_empty()
            && self.matches.is_empty()
            && self.auth_required_urls.is_empty()
    }

    /// Stores the crawl results for one side and collects its auth-required URLs
    pub fn record_crawl(&mut self, side: CrawlSide, outcome: CrawlOutcome) {
        self.auth_required_urls.extend(outcome.auth_required);
        match side {
            CrawlSide::Old => self.crawl_results_old = outcome.results,
            CrawlSide::New => self.crawl_results_new = outcome.results,
        }
    }

    pub fn crawl_results(&self, side: CrawlSide) -> &[ContentSignal] {
        match side {
            CrawlSide::Old => &self.crawl_results_old,
            CrawlSide::New => &self.crawl_results_new,
        }
    }

    /// Number of crawl results on one side with the given status
    pub fn count_by_status(&self, side: CrawlSide, status: FetchStatus) -> usize {
        self.crawl_results(side)
            .iter()
            .filter(|signal| signal.status == status)
            .count()
    }
}
