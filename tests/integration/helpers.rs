//! Shared fixtures for the integration tests

use async_trait::async_trait;
use redirect_mapper::config::CrawlerConfig;
use redirect_mapper::matching::{InferenceClient, InferenceError, InferenceResult};
use redirect_mapper::progress::ProgressReporter;
use std::sync::{Arc, Mutex};

/// Crawler settings with millisecond timings so retry tests stay fast
pub fn fast_crawler_config(max_retries: u32) -> CrawlerConfig {
    CrawlerConfig {
        enabled: true,
        max_retries,
        request_timeout_ms: 200,
        backoff_unit_ms: 1,
        crawl_delay_ms: 0,
    }
}

/// A small HTML page with every signal the parser extracts
pub fn html_page(title: &str, heading: &str, description: &str, body: &str) -> String {
    format!(
        r#"<html><head><title>{}</title><meta name="description" content="{}"></head>
        <body><h1>{}</h1><p>{}</p></body></html>"#,
        title, description, heading, body
    )
}

/// A JSON match array with one element per `(old, new, confidence)`
pub fn match_json(entries: &[(&str, &str, f64)]) -> String {
    let items: Vec<serde_json::Value> = entries
        .iter()
        .map(|(old, new, confidence)| {
            serde_json::json!({
                "oldUrl": old,
                "newUrl": new,
                "confidence": confidence,
                "reason": "matching topic",
            })
        })
        .collect();
    serde_json::Value::Array(items).to_string()
}

/// Progress reporter that records everything it is told
#[derive(Default)]
pub struct RecordingProgress {
    pub fractions: Mutex<Vec<f64>>,
    pub statuses: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn statuses(&self) -> Vec<String> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn fractions(&self) -> Vec<f64> {
        self.fractions.lock().unwrap().clone()
    }
}

impl ProgressReporter for RecordingProgress {
    fn set_progress(&self, fraction: f64) {
        self.fractions.lock().unwrap().push(fraction);
    }

    fn set_status(&self, message: &str) {
        self.statuses.lock().unwrap().push(message.to_string());
    }

    fn report_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

/// Inference client that replays canned responses in order
///
/// Once the script runs out every call answers with an empty array.
pub struct ScriptedClient {
    responses: Mutex<Vec<InferenceResult<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new(mut responses: Vec<InferenceResult<String>>) -> Arc<Self> {
        responses.reverse();
        Arc::new(Self {
            responses: Mutex::new(responses),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(texts: &[String]) -> Arc<Self> {
        Self::new(texts.iter().cloned().map(Ok).collect())
    }

    pub fn failing_with(error: InferenceError) -> Arc<Self> {
        Self::new(vec![Err(error)])
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceClient for ScriptedClient {
    async fn generate(&self, _model: &str, prompt: &str) -> InferenceResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Ok("[]".to_string()))
    }
}
