//! Run driver
//!
//! A run goes through fixed phases, one after the other:
//! 1. Crawl the old URLs, then the new URLs (crawled mode only)
//! 2. Checkpoint the crawl results
//! 3. Match old URLs against new URLs in batches
//! 4. Checkpoint the matches and complete the run
//!
//! Everything that can make a run fail for configuration reasons is
//! resolved before [`Pipeline::run`] is called: [`RunInputs::load`] reads the
//! URL lists and the caller resolves secrets up front.

use crate::config::{compute_run_fingerprint, Config, InputConfig};
use crate::crawler::{Coordinator, CrawlOutcome};
use crate::matching::{BatchFailure, InferenceClient, MatchInputs, MatchMode, MatchOrchestrator};
use crate::output::{summarize, MatchSummary};
use crate::progress::ProgressReporter;
use crate::state::{CrawlSide, Credentials, RunState};
use crate::storage::{RunStatus, Storage};
use crate::url::load_url_list;
use crate::{ConfigResult, Result};
use std::path::Path;
use std::sync::Arc;

/// The two URL lists of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunInputs {
    pub old_urls: Vec<String>,
    pub new_urls: Vec<String>,
}

impl RunInputs {
    pub fn new(old_urls: Vec<String>, new_urls: Vec<String>) -> Self {
        Self { old_urls, new_urls }
    }

    /// Reads both URL lists; missing or empty files are configuration errors
    pub fn load(config: &InputConfig) -> ConfigResult<Self> {
        Ok(Self {
            old_urls: load_url_list(Path::new(&config.old_urls))?,
            new_urls: load_url_list(Path::new(&config.new_urls))?,
        })
    }

    pub fn urls(&self, side: CrawlSide) -> &[String] {
        match side {
            CrawlSide::Old => &self.old_urls,
            CrawlSide::New => &self.new_urls,
        }
    }

    /// Fingerprint of the configuration text together with both lists
    pub fn fingerprint(&self, config_text: &str) -> String {
        let old = self.old_urls.join("\n");
        let new = self.new_urls.join("\n");
        compute_run_fingerprint(&[config_text, &old, &new])
    }
}

/// Crawl counts for one side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlReport {
    pub side: CrawlSide,
    pub total: usize,
    pub succeeded: usize,
    pub auth_required: usize,
}

impl CrawlReport {
    fn from_outcome(side: CrawlSide, outcome: &CrawlOutcome) -> Self {
        Self {
            side,
            total: outcome.results.len(),
            succeeded: outcome.success_count(),
            auth_required: outcome.auth_required.len(),
        }
    }

    pub fn failed(&self) -> usize {
        self.total - self.succeeded - self.auth_required
    }
}

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: i64,
    pub mode: MatchMode,
    pub model: String,
    /// Empty in URL-only mode
    pub crawl: Vec<CrawlReport>,
    pub summary: MatchSummary,
    pub total_batches: usize,
    pub failed_batches: Vec<BatchFailure>,
    pub auth_required_urls: Vec<String>,
    /// Whether fetches carried basic-auth credentials
    pub used_credentials: bool,
}

/// Drives one mapping run from inputs to persisted matches
pub struct Pipeline {
    coordinator: Coordinator,
    orchestrator: MatchOrchestrator,
    mode: MatchMode,
    credentials: Option<Credentials>,
}

impl Pipeline {
    pub fn new(coordinator: Coordinator, orchestrator: MatchOrchestrator, mode: MatchMode) -> Self {
        Self {
            coordinator,
            orchestrator,
            mode,
            credentials: None,
        }
    }

    /// Builds a pipeline from configuration, an inference client and resolved credentials
    pub fn from_config(
        config: &Config,
        client: Arc<dyn InferenceClient>,
        credentials: Option<Credentials>,
    ) -> Result<Self> {
        let coordinator = Coordinator::new(&config.crawler)?;

        let mut orchestrator = MatchOrchestrator::new(client, &config.inference.model)
            .with_batch_delay(config.inference.batch_delay());
        if let Some(size) = config.inference.batch_size {
            orchestrator = orchestrator.with_batch_size(size);
        }

        let mode = MatchMode::from_crawl_enabled(config.crawler.enabled);
        Ok(Self::new(coordinator, orchestrator, mode).with_credentials(credentials))
    }

    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Executes a run
    ///
    /// `state` is reset first, so results from an earlier run never leak
    /// into this one. The run is recorded in `storage` as running, then
    /// completed; if a checkpoint cannot be written the run is marked
    /// failed and the error is returned.
    pub async fn run(
        &self,
        inputs: &RunInputs,
        fingerprint: &str,
        state: &mut RunState,
        storage: &mut dyn Storage,
        progress: &dyn ProgressReporter,
    ) -> Result<RunReport> {
        state.reset();

        let run_id = storage.create_run(fingerprint, self.orchestrator.model(), self.mode)?;
        tracing::info!(run_id, mode = %self.mode, "Starting run");

        match self.execute(run_id, inputs, state, storage, progress).await {
            Ok(report) => {
                storage.complete_run(run_id)?;
                tracing::info!(
                    run_id,
                    matches = report.summary.total,
                    failed_batches = report.failed_batches.len(),
                    "Run completed"
                );
                Ok(report)
            }
            Err(e) => {
                if let Err(mark_err) = storage.update_run_status(run_id, RunStatus::Failed) {
                    tracing::warn!(run_id, "Failed to mark run as failed: {}", mark_err);
                }
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        run_id: i64,
        inputs: &RunInputs,
        state: &mut RunState,
        storage: &mut dyn Storage,
        progress: &dyn ProgressReporter,
    ) -> Result<RunReport> {
        let mut crawl = Vec::new();

        if self.mode == MatchMode::Crawled {
            for side in [CrawlSide::Old, CrawlSide::New] {
                let urls = inputs.urls(side);
                tracing::info!("Crawling {} {} URLs", urls.len(), side);

                let outcome = self
                    .coordinator
                    .crawl(urls, self.credentials.as_ref(), progress)
                    .await;
                progress.finish();

                let report = CrawlReport::from_outcome(side, &outcome);
                tracing::info!(
                    "{} site: {}/{} fetched, {} need authentication, {} failed",
                    side,
                    report.succeeded,
                    report.total,
                    report.auth_required,
                    report.failed()
                );
                crawl.push(report);

                state.record_crawl(side, outcome);
                storage.save_signals(run_id, side, state.crawl_results(side))?;
            }
        }

        let match_inputs = match self.mode {
            MatchMode::UrlOnly => MatchInputs::UrlOnly {
                old: &inputs.old_urls,
                new: &inputs.new_urls,
            },
            MatchMode::Crawled => MatchInputs::Crawled {
                old: &state.crawl_results_old,
                new: &state.crawl_results_new,
            },
        };
        let outcome = self.orchestrator.match_all(match_inputs, progress).await;
        progress.finish();

        state.matches = outcome.matches;
        storage.save_matches(run_id, &state.matches)?;

        Ok(RunReport {
            run_id,
            mode: self.mode,
            model: self.orchestrator.model().to_string(),
            crawl,
            summary: summarize(&state.matches),
            total_batches: outcome.total_batches,
            failed_batches: outcome.failed_batches,
            auth_required_urls: state.auth_required_urls.clone(),
            used_credentials: self.credentials.is_some(),
        })
    }
}
