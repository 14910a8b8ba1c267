//! Matching request construction
//!
//! A request pairs one batch of old URLs with the full pool of new URLs.
//! How each entry is rendered depends on the run's mode, which picks one
//! [`RequestBuilder`] implementation for the whole run.

use crate::state::ContentSignal;
use std::fmt;

/// One URL offered to the inference service, with its signals when crawled
#[derive(Debug, Clone, Copy)]
pub struct MatchCandidate<'a> {
    pub url: &'a str,
    pub signal: Option<&'a ContentSignal>,
}

impl<'a> MatchCandidate<'a> {
    pub fn bare(url: &'a str) -> Self {
        Self { url, signal: None }
    }

    pub fn crawled(signal: &'a ContentSignal) -> Self {
        Self {
            url: &signal.url,
            signal: Some(signal),
        }
    }
}

/// Whether page content is part of the matching evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Only URL strings are compared
    UrlOnly,
    /// Crawled titles, headings, descriptions and excerpts are included
    Crawled,
}

impl MatchMode {
    pub fn from_crawl_enabled(enabled: bool) -> Self {
        if enabled {
            Self::Crawled
        } else {
            Self::UrlOnly
        }
    }

    /// Selects the request builder for this mode
    pub fn request_builder(&self) -> Box<dyn RequestBuilder> {
        match self {
            Self::UrlOnly => Box::new(UrlOnlyRequest),
            Self::Crawled => Box::new(CrawledRequest),
        }
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::UrlOnly => "url_only",
            Self::Crawled => "crawled",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "url_only" => Some(Self::UrlOnly),
            "crawled" => Some(Self::Crawled),
            _ => None,
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// Renders the two URL sections of a matching request
pub trait RequestBuilder: Send + Sync {
    /// Section listing the current batch of old URLs
    fn old_block(&self, batch: &[MatchCandidate<'_>]) -> String;

    /// Section listing every candidate new URL
    fn new_block(&self, pool: &[MatchCandidate<'_>]) -> String;

    /// Phrase describing what the evidence consists of
    fn evidence(&self) -> &'static str;

    /// Suffix appended to section headings ("" or " with content")
    fn section_suffix(&self) -> &'static str;

    /// Assembles the full request text
    fn build(&self, batch: &[MatchCandidate<'_>], pool: &[MatchCandidate<'_>]) -> String {
        format!(
            "You map URLs from a retired website to their closest equivalents on its replacement. \
Compare the old and new URLs using {evidence}.

Old URLs{suffix}:
{old}

New URLs{suffix}:
{new}

Respond with a JSON array only, without markdown or commentary, where every element has this shape:
[
  {{
    \"oldUrl\": \"https://old.example/page\",
    \"newUrl\": \"https://new.example/page\",
    \"confidence\": 0.95,
    \"reason\": \"short justification\"
  }}
]

Match as many old URLs as you can. Confidence guide: 1.0 exact equivalent, 0.7-0.9 strong match, 0.5-0.6 uncertain.",
            evidence = self.evidence(),
            suffix = self.section_suffix(),
            old = self.old_block(batch),
            new = self.new_block(pool),
        )
    }
}

/// Bare URL lines, one per entry
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlOnlyRequest;

impl UrlOnlyRequest {
    fn lines(candidates: &[MatchCandidate<'_>]) -> String {
        candidates
            .iter()
            .map(|c| c.url)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl RequestBuilder for UrlOnlyRequest {
    fn old_block(&self, batch: &[MatchCandidate<'_>]) -> String {
        Self::lines(batch)
    }

    fn new_block(&self, pool: &[MatchCandidate<'_>]) -> String {
        Self::lines(pool)
    }

    fn evidence(&self) -> &'static str {
        "semantic similarity, keywords in the path, and URL structure"
    }

    fn section_suffix(&self) -> &'static str {
        ""
    }
}

/// Labelled blocks with the crawled signals, separated by blank lines
#[derive(Debug, Clone, Copy, Default)]
pub struct CrawledRequest;

impl CrawledRequest {
    fn render(candidate: &MatchCandidate<'_>) -> String {
        let field = |value: Option<&Option<String>>| {
            value
                .and_then(|v| v.as_deref())
                .unwrap_or_default()
                .to_string()
        };
        let signal = candidate.signal;

        format!(
            "URL: {}\nTitle: {}\nHeading: {}\nDescription: {}\nContent: {}",
            candidate.url,
            field(signal.map(|s| &s.title)),
            field(signal.map(|s| &s.heading)),
            field(signal.map(|s| &s.description)),
            field(signal.map(|s| &s.excerpt)),
        )
    }

    fn blocks(candidates: &[MatchCandidate<'_>]) -> String {
        candidates
            .iter()
            .map(Self::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl RequestBuilder for CrawledRequest {
    fn old_block(&self, batch: &[MatchCandidate<'_>]) -> String {
        Self::blocks(batch)
    }

    fn new_block(&self, pool: &[MatchCandidate<'_>]) -> String {
        Self::blocks(pool)
    }

    fn evidence(&self) -> &'static str {
        "semantic similarity, the page content shown, and URL structure"
    }

    fn section_suffix(&self) -> &'static str {
        " with content"
    }
}
