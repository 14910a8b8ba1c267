//! Matching module: pairing old URLs with new ones
//!
//! This module contains:
//! - Batch partitioning and the model-dependent batch size
//! - Request construction for URL-only and crawled modes
//! - The inference client abstraction and its Gemini implementation
//! - Response parsing and match record validation
//! - The orchestrator that ties the above together

mod batch;
mod client;
mod orchestrator;
mod prompt;
mod record;
mod response;

pub use batch::{partition, ModelClass, FAST_BATCH_SIZE, STANDARD_BATCH_SIZE};
pub use client::{
    GeminiClient, InferenceClient, InferenceError, InferenceResult, DEFAULT_BASE_URL,
};
pub use orchestrator::{
    BatchFailure, MatchInputs, MatchOrchestrator, MatchOutcome, DEFAULT_BATCH_DELAY,
};
pub use prompt::{CrawledRequest, MatchCandidate, MatchMode, RequestBuilder, UrlOnlyRequest};
pub use record::{
    ConfidenceBand, MatchRecord, RawConfidence, RawMatch, RecordRejection, HIGH_CONFIDENCE,
    MEDIUM_CONFIDENCE,
};
pub use response::{parse_match_response, strip_code_fences};
