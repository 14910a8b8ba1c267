use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Redirect Mapper
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub input: InputConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Locations of the two URL lists
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Line-oriented list of URLs on the retired site
    #[serde(rename = "old-urls")]
    pub old_urls: String,

    /// Line-oriented list of URLs on the replacement site
    #[serde(rename = "new-urls")]
    pub new_urls: String,
}

/// Fetch behavior configuration
///
/// All timings are in milliseconds. The defaults correspond to one time unit
/// being one second.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Fetch page content before matching (crawled mode) or match on URLs only
    #[serde(default = "default_crawl_enabled")]
    pub enabled: bool,

    /// Retries after the first attempt for timeouts and transient HTTP errors
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-request timeout
    #[serde(rename = "request-timeout-ms", default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Length of one backoff time unit
    #[serde(rename = "backoff-unit-ms", default = "default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,

    /// Politeness delay between consecutive fetches
    #[serde(rename = "crawl-delay-ms", default = "default_crawl_delay_ms")]
    pub crawl_delay_ms: u64,
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn backoff_unit(&self) -> Duration {
        Duration::from_millis(self.backoff_unit_ms)
    }

    pub fn crawl_delay(&self) -> Duration {
        Duration::from_millis(self.crawl_delay_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            enabled: default_crawl_enabled(),
            max_retries: default_max_retries(),
            request_timeout_ms: default_request_timeout_ms(),
            backoff_unit_ms: default_backoff_unit_ms(),
            crawl_delay_ms: default_crawl_delay_ms(),
        }
    }
}

/// Inference service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    /// Model identifier sent to the service; also selects the batch size class
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(rename = "api-key-env", default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of the generative language API
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Delay between consecutive batches
    #[serde(rename = "batch-delay-ms", default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// Overrides the batch size derived from the model class
    #[serde(rename = "batch-size", default)]
    pub batch_size: Option<usize>,
}

impl InferenceConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            batch_delay_ms: default_batch_delay_ms(),
            batch_size: None,
        }
    }
}

/// Basic authentication applied to every fetch
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub username: String,

    /// Environment variable holding the password
    #[serde(rename = "password-env", default = "default_password_env")]
    pub password_env: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite checkpoint database
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Path of the exported CSV; timestamped in the working directory when unset
    #[serde(rename = "csv-path", default)]
    pub csv_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            csv_path: None,
        }
    }
}

fn default_crawl_enabled() -> bool {
    false
}

fn default_max_retries() -> u32 {
    3
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

fn default_backoff_unit_ms() -> u64 {
    1_000
}

fn default_crawl_delay_ms() -> u64 {
    1_000
}

fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_batch_delay_ms() -> u64 {
    1_500
}

fn default_password_env() -> String {
    "REDIRECT_MAPPER_PASSWORD".to_string()
}

fn default_database_path() -> String {
    "redirect-mapper.db".to_string()
}
