//! Resolution of secrets named by the configuration
//!
//! Secrets never live in the TOML file. The config names environment
//! variables and they are read once at run start; a missing variable is a
//! configuration error raised before any network activity.

use crate::config::types::{AuthConfig, InferenceConfig};
use crate::state::Credentials;
use crate::ConfigError;
use secrecy::SecretString;

/// Reads the inference API key from the process environment
pub fn resolve_api_key(config: &InferenceConfig) -> Result<SecretString, ConfigError> {
    resolve_api_key_with(config, |name| std::env::var(name).ok())
}

/// Reads basic-auth credentials from the process environment
///
/// Returns `Ok(None)` when no `[auth]` section is configured.
pub fn resolve_credentials(auth: Option<&AuthConfig>) -> Result<Option<Credentials>, ConfigError> {
    resolve_credentials_with(auth, |name| std::env::var(name).ok())
}

/// Like [`resolve_api_key`], with an explicit variable lookup
pub fn resolve_api_key_with<F>(config: &InferenceConfig, lookup: F) -> Result<SecretString, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    read_secret(&config.api_key_env, &lookup).map(SecretString::from)
}

/// Like [`resolve_credentials`], with an explicit variable lookup
pub fn resolve_credentials_with<F>(
    auth: Option<&AuthConfig>,
    lookup: F,
) -> Result<Option<Credentials>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(auth) = auth else {
        return Ok(None);
    };

    let password = read_secret(&auth.password_env, &lookup)?;
    Ok(Some(Credentials::new(auth.username.clone(), password)))
}

fn read_secret<F>(name: &str, lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingSecret {
            name: name.to_string(),
        }),
    }
}
