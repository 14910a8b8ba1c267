use crate::config::types::{
    AuthConfig, Config, CrawlerConfig, InferenceConfig, InputConfig, OutputConfig,
};
use crate::ConfigError;
use url::Url;

/// Upper bound on retries; 3^10 backoff units is already several hours
const MAX_RETRIES_LIMIT: u32 = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_input_config(&config.input)?;
    validate_crawler_config(&config.crawler)?;
    validate_inference_config(&config.inference)?;
    if let Some(auth) = &config.auth {
        validate_auth_config(auth)?;
    }
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates input list locations
fn validate_input_config(config: &InputConfig) -> Result<(), ConfigError> {
    if config.old_urls.trim().is_empty() {
        return Err(ConfigError::Validation(
            "old-urls cannot be empty".to_string(),
        ));
    }

    if config.new_urls.trim().is_empty() {
        return Err(ConfigError::Validation(
            "new-urls cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_retries > MAX_RETRIES_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max-retries must be at most {}, got {}",
            MAX_RETRIES_LIMIT, config.max_retries
        )));
    }

    if config.request_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-ms must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates inference configuration
fn validate_inference_config(config: &InferenceConfig) -> Result<(), ConfigError> {
    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation("model cannot be empty".to_string()));
    }

    if config.api_key_env.trim().is_empty() {
        return Err(ConfigError::Validation(
            "api-key-env cannot be empty".to_string(),
        ));
    }

    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.batch_size == Some(0) {
        return Err(ConfigError::Validation(
            "batch-size must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates authentication configuration
fn validate_auth_config(config: &AuthConfig) -> Result<(), ConfigError> {
    if config.username.trim().is_empty() {
        return Err(ConfigError::Validation(
            "auth username cannot be empty".to_string(),
        ));
    }

    if config.password_env.trim().is_empty() {
        return Err(ConfigError::Validation(
            "auth password-env cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if matches!(&config.csv_path, Some(path) if path.is_empty()) {
        return Err(ConfigError::Validation(
            "csv-path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}
