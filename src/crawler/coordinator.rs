//! Crawl coordinator - sequential crawl orchestration
//!
//! This module drives the fetcher over an ordered URL list:
//! - One request at a time, in input order
//! - A fixed politeness delay between requests
//! - Progress and status reporting after each fetch
//! - Separating out URLs that require authentication

use crate::config::CrawlerConfig;
use crate::crawler::Fetcher;
use crate::progress::ProgressReporter;
use crate::state::{ContentSignal, Credentials, FetchStatus};
use crate::url::truncate_for_display;
use std::time::Duration;

/// Result of crawling one URL list
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    /// One signal per input URL, in input order
    pub results: Vec<ContentSignal>,

    /// URLs classified as auth-required, in input order
    pub auth_required: Vec<String>,
}

impl CrawlOutcome {
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }
}

/// Sequential crawl driver
pub struct Coordinator {
    fetcher: Fetcher,
    crawl_delay: Duration,
}

impl Coordinator {
    /// Creates a coordinator with a fetcher built from the configuration
    pub fn new(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_fetcher(Fetcher::new(config)?, config.crawl_delay()))
    }

    pub fn with_fetcher(fetcher: Fetcher, crawl_delay: Duration) -> Self {
        Self {
            fetcher,
            crawl_delay,
        }
    }

    /// Crawls every URL in order
    ///
    /// `results.len()` always equals `urls.len()`; results are never
    /// reordered and requests are never issued in parallel.
    pub async fn crawl(
        &self,
        urls: &[String],
        credentials: Option<&Credentials>,
        progress: &dyn ProgressReporter,
    ) -> CrawlOutcome {
        let total = urls.len();
        let mut outcome = CrawlOutcome {
            results: Vec::with_capacity(total),
            auth_required: Vec::new(),
        };

        tracing::info!("Crawling {} URLs", total);

        for (index, url) in urls.iter().enumerate() {
            if index > 0 && !self.crawl_delay.is_zero() {
                tokio::time::sleep(self.crawl_delay).await;
            }

            let signal = self.fetcher.fetch(url, credentials).await;

            if signal.status == FetchStatus::AuthRequired {
                outcome.auth_required.push(url.clone());
            }
            outcome.results.push(signal);

            progress.set_progress((index + 1) as f64 / total as f64);
            progress.set_status(&format!(
                "Crawling {}/{}: {}",
                index + 1,
                total,
                truncate_for_display(url)
            ));
        }

        tracing::info!(
            "Crawled {}/{} URLs successfully ({} require authentication)",
            outcome.success_count(),
            total,
            outcome.auth_required.len()
        );

        outcome
    }
}
