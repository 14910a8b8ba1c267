//! Batched matching against the inference service
//!
//! Old URLs are split into contiguous batches; each batch is sent together
//! with the full pool of new URLs. A failed batch is reported and skipped,
//! and the run continues with the next one.

use crate::matching::batch::{partition, ModelClass};
use crate::matching::client::InferenceClient;
use crate::matching::prompt::{MatchCandidate, MatchMode};
use crate::matching::record::MatchRecord;
use crate::matching::response::parse_match_response;
use crate::progress::ProgressReporter;
use crate::state::ContentSignal;
use std::sync::Arc;
use std::time::Duration;

/// Default pause between consecutive batches
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(1500);

/// The two URL sets to match, in the shape the run's mode requires
#[derive(Debug, Clone, Copy)]
pub enum MatchInputs<'a> {
    /// Raw URL strings
    UrlOnly { old: &'a [String], new: &'a [String] },
    /// Crawl results; only successful fetches take part
    Crawled {
        old: &'a [ContentSignal],
        new: &'a [ContentSignal],
    },
}

impl<'a> MatchInputs<'a> {
    pub fn mode(&self) -> MatchMode {
        match self {
            Self::UrlOnly { .. } => MatchMode::UrlOnly,
            Self::Crawled { .. } => MatchMode::Crawled,
        }
    }

    /// Candidate lists for the old and new side, input order preserved
    pub fn candidates(&self) -> (Vec<MatchCandidate<'a>>, Vec<MatchCandidate<'a>>) {
        match *self {
            Self::UrlOnly { old, new } => (
                old.iter().map(|u| MatchCandidate::bare(u)).collect(),
                new.iter().map(|u| MatchCandidate::bare(u)).collect(),
            ),
            Self::Crawled { old, new } => (
                successful(old).map(MatchCandidate::crawled).collect(),
                successful(new).map(MatchCandidate::crawled).collect(),
            ),
        }
    }
}

fn successful(signals: &[ContentSignal]) -> impl Iterator<Item = &ContentSignal> {
    signals.iter().filter(|s| s.is_success())
}

/// A batch whose request or response failed
#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    /// One-based batch number
    pub batch_index: usize,
    /// Number of old URLs in the batch
    pub size: usize,
    pub error: String,
}

/// Aggregated result of matching every batch
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    /// Matches in batch order, then in response order within a batch
    pub matches: Vec<MatchRecord>,
    pub failed_batches: Vec<BatchFailure>,
    pub total_batches: usize,
}

/// Drives batched matching requests through an [`InferenceClient`]
pub struct MatchOrchestrator {
    client: Arc<dyn InferenceClient>,
    model: String,
    batch_size: usize,
    batch_delay: Duration,
}

impl MatchOrchestrator {
    /// Creates an orchestrator with the batch size implied by the model
    pub fn new(client: Arc<dyn InferenceClient>, model: impl Into<String>) -> Self {
        let model = model.into();
        let batch_size = ModelClass::from_model_name(&model).batch_size();
        Self {
            client,
            model,
            batch_size,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of requests `old_count` old URLs will take
    pub fn batch_count(&self, old_count: usize) -> usize {
        old_count.div_ceil(self.batch_size)
    }

    /// Matches every old URL against the full new pool
    ///
    /// Never fails as a whole: per-batch errors end up in
    /// [`MatchOutcome::failed_batches`] and the remaining batches still run.
    pub async fn match_all(
        &self,
        inputs: MatchInputs<'_>,
        progress: &dyn ProgressReporter,
    ) -> MatchOutcome {
        let builder = inputs.mode().request_builder();
        let (old, pool) = inputs.candidates();
        let batches = partition(&old, self.batch_size);
        let total = batches.len();

        let mut outcome = MatchOutcome {
            total_batches: total,
            ..Default::default()
        };

        tracing::info!(
            mode = %inputs.mode(),
            model = %self.model,
            "Matching {} old URLs against {} new URLs in {} batches",
            old.len(),
            pool.len(),
            total
        );

        for (index, batch) in batches.iter().enumerate() {
            let number = index + 1;
            progress.set_progress(number as f64 / total as f64);
            progress.set_status(&format!(
                "Processing batch {}/{} ({} URLs)...",
                number,
                total,
                batch.len()
            ));

            let prompt = builder.build(batch, &pool);
            let result = self
                .client
                .generate(&self.model, &prompt)
                .await
                .and_then(|text| parse_match_response(&text));

            match result {
                Ok(records) => {
                    tracing::debug!(batch = number, matches = records.len(), "Batch complete");
                    outcome.matches.extend(records);
                }
                Err(e) => {
                    progress.report_error(&format!("Error in batch {}: {}", number, e));
                    outcome.failed_batches.push(BatchFailure {
                        batch_index: number,
                        size: batch.len(),
                        error: e.to_string(),
                    });
                }
            }

            if number < total && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        tracing::info!(
            "Matching produced {} matches ({} of {} batches failed)",
            outcome.matches.len(),
            outcome.failed_batches.len(),
            total
        );

        outcome
    }
}
