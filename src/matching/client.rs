//! Inference service client
//!
//! The matching orchestrator only sees the [`InferenceClient`] trait: a
//! prompt goes in, raw text comes out. [`GeminiClient`] implements it against
//! the Generative Language `generateContent` endpoint.
//!
//! # Example
//!
//! ```no_run
//! use redirect_mapper::matching::{GeminiClient, InferenceClient};
//! use secrecy::SecretString;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new(SecretString::from("api-key".to_string()))?;
//! let text = client.generate("gemini-3-flash-preview", "Say hi").await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::InferenceConfig;

/// Default endpoint of the Generative Language API
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Upper bound on a single inference call; large batches take minutes
const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// Longest error body kept in [`InferenceError::Api`]
const ERROR_BODY_MAX_CHARS: usize = 500;

/// Errors from a single inference call or from parsing its response
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("inference API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("inference API returned no text")]
    EmptyResponse,

    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

/// Result type for inference operations
pub type InferenceResult<T> = Result<T, InferenceError>;

/// A text-in, text-out inference service
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Sends `prompt` to `model` and returns the generated text
    async fn generate(&self, model: &str, prompt: &str) -> InferenceResult<String>;
}

/// Client for the Gemini `generateContent` endpoint
pub struct GeminiClient {
    client: Client,
    api_key: SecretString,
    base_url: String,
}

impl GeminiClient {
    /// Creates a client against the public endpoint
    pub fn new(api_key: SecretString) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(client, api_key))
    }

    /// Creates a client around an existing HTTP client
    pub fn with_client(client: Client, api_key: SecretString) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Creates a client using the configured endpoint
    pub fn from_config(
        config: &InferenceConfig,
        api_key: SecretString,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(api_key)?.with_base_url(config.base_url.clone()))
    }

    /// Sets a custom base URL (proxies, test servers)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct ResponseCandidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate
    fn into_text(self) -> InferenceResult<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(InferenceError::InvalidResponse(format!(
                "prompt blocked: {}",
                reason
            )));
        }

        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            Err(InferenceError::EmptyResponse)
        } else {
            Ok(text)
        }
    }
}

#[async_trait]
impl InferenceClient for GeminiClient {
    async fn generate(&self, model: &str, prompt: &str) -> InferenceResult<String> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        tracing::debug!(model, prompt_chars = prompt.len(), "Sending inference request");

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Api {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_MAX_CHARS).collect(),
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed.into_text()
    }
}
