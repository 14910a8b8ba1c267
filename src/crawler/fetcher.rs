//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building the HTTP client with timeout and redirect policy
//! - Rotating user agents between attempts
//! - Attaching basic-auth credentials
//! - Retry logic for timeouts and transient HTTP errors
//! - Classifying every failure into a `ContentSignal` status

use crate::config::CrawlerConfig;
use crate::crawler::parser::parse_html;
use crate::state::{ContentSignal, Credentials};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{redirect::Policy, Client};
use secrecy::ExposeSecret;
use std::time::Duration;

/// User agents rotated by attempt number
pub const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36",
];

/// Status codes classified as an authorization challenge
pub const AUTH_STATUS_CODES: [u16; 2] = [401, 403];

/// Status codes worth retrying
pub const TRANSIENT_STATUS_CODES: [u16; 5] = [429, 500, 502, 503, 504];

/// Backoff base for timeouts: waits 1, 2, 4, ... units
const TIMEOUT_BACKOFF_BASE: u32 = 2;

/// Backoff base for transient HTTP errors: waits 1, 3, 9, ... units
const HTTP_BACKOFF_BASE: u32 = 3;

/// Maximum redirect hops followed automatically
const MAX_REDIRECTS: usize = 10;

/// Maximum length of an unclassified error message
const ERROR_DETAIL_MAX_CHARS: usize = 100;

/// Result of a single HTTP attempt, before the retry policy is applied
#[derive(Debug)]
enum Attempt {
    /// Page fetched and parsed
    Page(crate::crawler::PageSignals),

    /// Request or body read timed out
    Timeout,

    /// Server answered with a 4xx/5xx status
    HttpStatus(u16),

    /// Anything else (connection refused, TLS, redirect loop, ...)
    Error(String),
}

/// Builds an HTTP client with proper configuration
///
/// The user agent is not set here; it is chosen per attempt.
///
/// # Example
///
/// ```no_run
/// use redirect_mapper::config::CrawlerConfig;
/// use redirect_mapper::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(config.request_timeout())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns the user agent used for a given attempt (0-indexed)
pub fn user_agent_for(attempt: u32) -> &'static str {
    USER_AGENTS[attempt as usize % USER_AGENTS.len()]
}

/// Delay before retrying after `attempt` failed: `unit * base^attempt`
pub fn backoff_delay(base: u32, attempt: u32, unit: Duration) -> Duration {
    unit.saturating_mul(base.saturating_pow(attempt))
}

/// Fetches pages and classifies the outcome
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx/3xx | Parse → Success |
/// | HTTP 401/403 | Immediate → AuthRequired |
/// | HTTP 429/500/502/503/504 | Retry up to `max_retries`, wait 3^attempt units |
/// | Other HTTP 4xx/5xx | Immediate → Failed ("HTTP <code>") |
/// | Timeout | Retry up to `max_retries`, wait 2^attempt units |
/// | Anything else | Immediate → Failed (message truncated) |
pub struct Fetcher {
    client: Client,
    max_retries: u32,
    backoff_unit: Duration,
}

impl Fetcher {
    /// Creates a fetcher with its own HTTP client
    pub fn new(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, config: &CrawlerConfig) -> Self {
        Self {
            client,
            max_retries: config.max_retries,
            backoff_unit: config.backoff_unit(),
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Fetches a URL and returns its content signal
    ///
    /// Never fails: every error is folded into the returned status and
    /// `error_detail`. At most `max_retries + 1` requests are sent.
    pub async fn fetch(&self, url: &str, credentials: Option<&Credentials>) -> ContentSignal {
        let mut attempt: u32 = 0;

        loop {
            let outcome = self.attempt(url, attempt, credentials).await;

            let base = match outcome {
                Attempt::Page(page) => {
                    tracing::debug!(url, attempt, "Fetched page");
                    return ContentSignal::success(url, page);
                }
                Attempt::HttpStatus(code) if AUTH_STATUS_CODES.contains(&code) => {
                    tracing::warn!(url, status = code, "Authentication required");
                    return ContentSignal::auth_required(url, code);
                }
                Attempt::HttpStatus(code) if TRANSIENT_STATUS_CODES.contains(&code) => {
                    if attempt >= self.max_retries {
                        return ContentSignal::failed(url, format!("HTTP {}", code));
                    }
                    tracing::warn!(url, status = code, attempt, "Transient HTTP error, retrying");
                    HTTP_BACKOFF_BASE
                }
                Attempt::HttpStatus(code) => {
                    tracing::debug!(url, status = code, "HTTP error");
                    return ContentSignal::failed(url, format!("HTTP {}", code));
                }
                Attempt::Timeout => {
                    if attempt >= self.max_retries {
                        tracing::warn!(url, attempts = attempt + 1, "Giving up after timeouts");
                        return ContentSignal::failed(url, "Timeout");
                    }
                    tracing::warn!(url, attempt, "Request timed out, retrying");
                    TIMEOUT_BACKOFF_BASE
                }
                Attempt::Error(message) => {
                    tracing::debug!(url, error = %message, "Fetch failed");
                    return ContentSignal::failed(url, truncate_detail(&message));
                }
            };

            tokio::time::sleep(backoff_delay(base, attempt, self.backoff_unit)).await;
            attempt += 1;
        }
    }

    /// Sends one request and reads the body
    async fn attempt(&self, url: &str, attempt: u32, credentials: Option<&Credentials>) -> Attempt {
        let mut request = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent_for(attempt))
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.5");

        if let Some(creds) = credentials {
            request = request.basic_auth(creds.username(), Some(creds.password().expose_secret()));
        }

        tracing::trace!(url, attempt, "Sending request");

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return classify_error(e),
        };

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Attempt::HttpStatus(status.as_u16());
        }

        match response.text().await {
            Ok(body) => Attempt::Page(parse_html(&body)),
            Err(e) => classify_error(e),
        }
    }
}

fn classify_error(error: reqwest::Error) -> Attempt {
    if error.is_timeout() {
        Attempt::Timeout
    } else {
        Attempt::Error(error.to_string())
    }
}

/// Keeps the first [`ERROR_DETAIL_MAX_CHARS`] characters of an error message
fn truncate_detail(message: &str) -> String {
    message.chars().take(ERROR_DETAIL_MAX_CHARS).collect()
}
