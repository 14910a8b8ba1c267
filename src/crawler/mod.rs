//! Crawler module for fetching page content signals
//!
//! This module contains the crawling logic, including:
//! - HTTP fetching with retry and backoff
//! - HTML parsing into content signals
//! - Sequential, throttled crawl coordination

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{Coordinator, CrawlOutcome};
pub use fetcher::{
    backoff_delay, build_http_client, user_agent_for, Fetcher, AUTH_STATUS_CODES,
    TRANSIENT_STATUS_CODES, USER_AGENTS,
};
pub use parser::{parse_html, PageSignals, EXCERPT_MAX_CHARS};
